use crate::{Atom, Error, Rule, Term};
use nom::{
    bytes::complete::{is_not, tag, take_until, take_while, take_while1},
    character::complete::char as nomchar,
    combinator::{map, rest},
    sequence::{delimited, pair, preceded, separated_pair},
};
use std::path::Path;

pub type IResult<I, O, E = nom::error::Error<I>> = Result<(I, O), nom::Err<E>>;

type In<'a> = &'a str;

pub const SEPARATOR: &str = "=>";
pub const COMMENT: char = '#';

/// Why a line produced no rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    Blank,
    Comment,
    NoSeparator,
    NoConclusion,
}

//////////////////////////////////////

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

pub fn name(s: In) -> IResult<In, In> {
    take_while1(is_word)(s)
}

/// The raw text between the parentheses, at least one character.
pub fn arg_list(s: In) -> IResult<In, In> {
    let open = preceded(take_while(char::is_whitespace), nomchar('('));
    delimited(open, is_not(")"), nomchar(')'))(s)
}

pub fn argument(token: &str) -> Term {
    Term::classify(token.trim().trim_matches(is_quote))
}

pub fn atom_pattern(s: In) -> IResult<In, Atom> {
    let to_atom = |(name, args): (In, In)| Atom::new(name, args.split(',').map(argument).collect());
    map(pair(name, arg_list), to_atom)(s)
}

/// Every atom pattern in `s`, left to right. Text between patterns is skipped.
pub fn scan_atoms(mut s: In) -> Vec<Atom> {
    let mut atoms = vec![];
    while !s.is_empty() {
        match atom_pattern(s) {
            Ok((remaining, atom)) => {
                atoms.push(atom);
                s = remaining;
            }
            Err(_) => {
                let mut chars = s.chars();
                chars.next();
                s = chars.as_str();
            }
        }
    }
    atoms
}

/// Splits at the first separator.
pub fn segments(s: In) -> IResult<In, (In, In)> {
    separated_pair(take_until(SEPARATOR), tag(SEPARATOR), rest)(s)
}

pub fn parse_line(line: &str) -> Result<Rule, Skip> {
    let line = line.trim();
    if line.is_empty() {
        return Err(Skip::Blank);
    }
    if line.starts_with(COMMENT) {
        return Err(Skip::Comment);
    }
    let (_, (premise, conclusion)) = segments(line).map_err(|_| Skip::NoSeparator)?;
    let premise = scan_atoms(premise);
    let mut conclusions = scan_atoms(conclusion).into_iter();
    let conclusion = conclusions.next().ok_or(Skip::NoConclusion)?;
    let extra = conclusions.count();
    if extra > 0 {
        tracing::debug!("dropping {extra} extra conclusion atom(s) in `{line}`");
    }
    Ok(Rule::new(premise, conclusion, line))
}

pub fn parse_rule_line(line: &str) -> Option<Rule> {
    parse_line(line).ok()
}

/// Never fails: lines that are not rules are skipped.
pub fn parse_rules(text: &str) -> Vec<Rule> {
    let mut rules = vec![];
    for (lidx, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(rule) => rules.push(rule),
            Err(Skip::NoSeparator | Skip::NoConclusion) => {
                tracing::debug!("skipping line {}: `{}`", lidx + 1, line.trim());
            }
            Err(Skip::Blank | Skip::Comment) => {}
        }
    }
    rules
}

pub fn parse_rules_file(path: impl AsRef<Path>) -> Result<Vec<Rule>, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let rules = parse_rules(&text);
    tracing::info!("loaded {} rule(s) from {}", rules.len(), path.display());
    Ok(rules)
}
