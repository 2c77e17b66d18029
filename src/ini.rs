//! Job file format
//!
//! Reading is line oriented: every line is classified by a small nom
//! parser (section header, entry, continuation, comment, blank), then
//! folded into sections. Writing produces a single `[general]` section that
//! the reader and [`OqParamBuilder`](crate::OqParamBuilder) turn back into
//! an equivalent [`OqParam`].

use std::collections::BTreeMap;

use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while1},
    character::complete::{char, one_of, space0, space1},
    combinator::{all_consuming, eof, map, rest, value},
    error::{context, ContextError, ParseError as NomParseError, VerboseError},
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};
use tracing::warn;

use crate::diagnostics::{self, Diagnostic};
use crate::inputs::{roles, InputSource};
use crate::oqparam::OqParam;

/// Key under which a site file is written, instead of `sites_file`
pub const SITES_CSV: &str = "sites_csv";

const FILE_SUFFIX: &str = "_file";

// ============================================================================
// Document model
// ============================================================================

/// One `[section]` with its entries in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

/// A parsed job file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IniDocument {
    pub sections: Vec<IniSection>,
}

impl IniDocument {
    /// Merge all sections into one mapping. A key set again later wins and
    /// produces a warning.
    pub fn flatten(&self) -> (BTreeMap<String, String>, Vec<Diagnostic>) {
        let mut values = BTreeMap::new();
        let mut diags = Vec::new();
        for section in &self.sections {
            for (key, val) in &section.entries {
                if values.insert(key.clone(), val.clone()).is_some() {
                    let diag = diagnostics::duplicate_parameter(key, &section.name);
                    diag.log();
                    diags.push(diag);
                }
            }
        }
        (values, diags)
    }
}

/// Role for an input key: `gsim_logic_tree_file` is `gsim_logic_tree`,
/// `sites_csv` is `sites`. Other keys are parameters.
pub fn input_role(key: &str) -> Option<&str> {
    if key == SITES_CSV {
        return Some(roles::SITES);
    }
    key.strip_suffix(FILE_SUFFIX).filter(|role| !role.is_empty())
}

/// Key under which an input role is written
pub fn input_key(role: &str) -> String {
    if role == roles::SITES {
        SITES_CSV.to_string()
    } else {
        format!("{}{}", role, FILE_SUFFIX)
    }
}

// ============================================================================
// Reader
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Line<'a> {
    Blank,
    Comment,
    Section(&'a str),
    Entry(&'a str, &'a str),
    Continuation(&'a str),
}

/// Parse a job file. Entries before the first header go to `[general]`.
pub fn parse_ini(input: &str) -> Result<IniDocument, String> {
    let mut doc = IniDocument::default();
    let mut current = IniSection {
        name: "general".to_string(),
        entries: Vec::new(),
    };

    for (lineno, raw) in input.lines().enumerate() {
        let parsed = match all_consuming(line::<VerboseError<&str>>)(raw) {
            Ok((_, parsed)) => parsed,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(format!(
                    "line {}: {}",
                    lineno + 1,
                    nom::error::convert_error(raw, e)
                ))
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(format!("line {}: incomplete input", lineno + 1))
            }
        };
        match parsed {
            Line::Blank | Line::Comment => {}
            Line::Section(name) => {
                let finished = std::mem::replace(
                    &mut current,
                    IniSection {
                        name: name.trim().to_string(),
                        entries: Vec::new(),
                    },
                );
                if !finished.entries.is_empty() {
                    doc.sections.push(finished);
                }
            }
            Line::Entry(key, val) => {
                current
                    .entries
                    .push((key.trim().to_lowercase(), val.trim().to_string()));
            }
            Line::Continuation(more) => match current.entries.last_mut() {
                Some((_, val)) => {
                    if !val.is_empty() {
                        val.push('\n');
                    }
                    val.push_str(more.trim());
                }
                None => {
                    return Err(format!(
                        "line {}: continuation line without a preceding key",
                        lineno + 1
                    ))
                }
            },
        }
    }
    if !current.entries.is_empty() {
        doc.sections.push(current);
    }
    Ok(doc)
}

fn line<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Line<'a>, E> {
    alt((
        value(Line::Blank, preceded(space0, eof)),
        value(Line::Comment, preceded(space0, preceded(one_of("#;"), rest))),
        map(preceded(space1, rest), Line::Continuation),
        map(section_header, Line::Section),
        map(entry, |(k, v)| Line::Entry(k, v)),
    ))(input)
}

fn section_header<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, E> {
    terminated(
        delimited(
            char('['),
            take_till1(|c: char| c == ']'),
            context("closing bracket", char(']')),
        ),
        space0,
    )(input)
}

fn entry<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (&'a str, &'a str), E> {
    separated_pair(
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.' || c == '-'),
        delimited(space0, context("'=' after key", one_of("=:")), space0),
        rest,
    )(input)
}

// ============================================================================
// Writer
// ============================================================================

/// Render `oq` as a job file. Inline inputs have no file to point at and
/// are left out.
pub fn to_ini(oq: &OqParam) -> String {
    let mut lines = vec!["[general]".to_string()];
    for (name, val) in oq.params.entries() {
        lines.push(format_entry(name, &val.to_raw()));
    }
    for (role, source) in oq.inputs.iter() {
        if role == roles::JOB_INI {
            continue;
        }
        match source {
            InputSource::Inline(_) => {
                warn!("input {} is inline and is not written to the job file", role)
            }
            InputSource::Path(_) | InputSource::Paths(_) => {
                lines.push(format_entry(&input_key(role), &source.describe()))
            }
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Lines after the first are indented so they read back as continuations
fn format_entry(key: &str, val: &str) -> String {
    if val.is_empty() {
        format!("{} =", key)
    } else {
        format!("{} = {}", key, val.replace('\n', "\n    "))
    }
}
