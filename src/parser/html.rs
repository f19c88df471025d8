//! Recogniser for the small set of HTML tags passed through to the tree.
//!
//! Only `<br>`, `<div>`/`</div>` with `align`/`width`, and `<img>` with
//! `src`/`alt`/`align`/`width` are accepted. Attribute values must be double
//! quoted; any other attribute rejects the whole tag.

use crate::ast::{HtmlDivProps, HtmlImageProps};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_while, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{map, opt};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, separated_pair, terminated, tuple};

/// A recognised passthrough tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HtmlTag {
    Break,
    DivOpen(HtmlDivProps),
    DivClose,
    Image(HtmlImageProps),
}

type Attribute<'a> = (&'a str, &'a str);

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(
        char('"'),
        take_while(|c: char| c != '"' && c != '\n'),
        char('"'),
    )(input)
}

fn attribute(input: &str) -> IResult<&str, Attribute<'_>> {
    preceded(
        multispace1,
        separated_pair(
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
            delimited(multispace0, char('='), multispace0),
            quoted,
        ),
    )(input)
}

fn self_closing_end(input: &str) -> IResult<&str, ()> {
    map(
        tuple((multispace0, opt(char('/')), char('>'))),
        |_| (),
    )(input)
}

fn line_break(input: &str) -> IResult<&str, Vec<Attribute<'_>>> {
    map(preceded(tag_no_case("<br"), self_closing_end), |_| Vec::new())(input)
}

fn div_open(input: &str) -> IResult<&str, Vec<Attribute<'_>>> {
    delimited(
        tag_no_case("<div"),
        many0(attribute),
        preceded(multispace0, char('>')),
    )(input)
}

fn div_close(input: &str) -> IResult<&str, Vec<Attribute<'_>>> {
    map(
        terminated(tag_no_case("</div"), preceded(multispace0, char('>'))),
        |_| Vec::new(),
    )(input)
}

fn image(input: &str) -> IResult<&str, Vec<Attribute<'_>>> {
    terminated(preceded(tag_no_case("<img"), many0(attribute)), self_closing_end)(input)
}

fn build_div(attributes: &[Attribute<'_>]) -> Option<HtmlDivProps> {
    let mut props = HtmlDivProps::default();
    for &(name, value) in attributes {
        match name {
            "align" => props.align = Some(value.to_string()),
            "width" => props.width = Some(value.to_string()),
            _ => return None,
        }
    }
    Some(props)
}

fn build_image(attributes: &[Attribute<'_>]) -> Option<HtmlImageProps> {
    let mut src = None;
    let mut props = HtmlImageProps::default();
    for &(name, value) in attributes {
        match name {
            "src" => src = Some(value.to_string()),
            "alt" => props.alt = Some(value.to_string()),
            "align" => props.align = Some(value.to_string()),
            "width" => props.width = Some(value.to_string()),
            _ => return None,
        }
    }
    props.src = src?;
    Some(props)
}

/// Tries to recognise an allowed tag at the start of `input`, which must
/// begin with `<`. Returns the tag and the number of bytes it spans.
pub(crate) fn recognize(input: &str) -> Option<(HtmlTag, usize)> {
    let (rest, tag) = alt((
        map(line_break, |_| Some(HtmlTag::Break)),
        map(div_close, |_| Some(HtmlTag::DivClose)),
        map(div_open, |attributes| {
            build_div(&attributes).map(HtmlTag::DivOpen)
        }),
        map(image, |attributes| {
            build_image(&attributes).map(HtmlTag::Image)
        }),
    ))(input)
    .ok()?;

    let consumed = input.len() - rest.len();
    tag.map(|tag| (tag, consumed))
}
