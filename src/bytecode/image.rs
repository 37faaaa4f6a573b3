/*!
  A program image is written as comma separated decimal integers, possibly negative, as
  in `1002,4,3,4,33`. Whitespace around the numbers and a trailing newline are tolerated.
*/

use nom::{
  character::complete::{char as one_char, digit1, multispace0},
  combinator::{all_consuming, cut, map_res, opt, recognize},
  error::{Error as NomError, ErrorKind},
  multi::separated_list1,
  sequence::{delimited, pair},
  Finish,
  IResult
};

use super::Value;
use crate::error::VmError;

fn value_p(input: &str) -> IResult<&str, Value> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |text: &str| text.parse::<Value>()
  )(input)
}

fn image_p(input: &str) -> IResult<&str, Vec<Value>> {
  all_consuming(
    delimited(
      multispace0,
      separated_list1(
        delimited(multispace0, one_char(','), multispace0),
        // Once a separator has been seen, a number must follow.
        cut(value_p)
      ),
      multispace0
    )
  )(input)
}

/// Parses the text of a program image into its words.
pub fn parse_image(text: &str) -> Result<Vec<Value>, VmError> {
  image_p(text)
    .finish()
    .map(|(_rest, words)| words)
    .map_err(|NomError{ input, code }: NomError<&str>| {
      let message = match code {
        ErrorKind::MapRes => "number out of range".to_string(),
        ErrorKind::Eof    => "unexpected trailing text".to_string(),
        _                 => format!("expected a signed integer ({:?})", code),
      };
      VmError::Parse{ offset: text.len() - input.len(), message }
    })
}
