//! Interactive manual assignment
//!
//! Reads one command per line and applies it to a `Session`. Bad commands and
//! rejected operations are reported and the loop keeps going.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use seatplan_app::config::Config;
use seatplan_app::export::export_to_excel;
use seatplan_app::routing::group_route_url;
use seatplan_domain::model::Plan;
use seatplan_domain::service::Session;
use seatplan_infra::save_plan;
use seatplan_types::{Result, Strategy};

const HELP: &str = "\
Commands:
  show                       list groups
  unassigned                 list students without a group
  assign <student> <group>   seat a student (spills to the next free group)
  remove <student> <group>   move a student back to unassigned
  reorder <group> <ids..>    set the pickup order of a group
  link <group>               print the directions link of a group
  save <plan.json>           write the groups as a plan file
  export <file.xlsx>         write the groups to Excel
  help                       show this help
  quit                       leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Show,
    Unassigned,
    Assign { student: String, group: u32 },
    Remove { student: String, group: u32 },
    Reorder { group: u32, order: Vec<String> },
    Link { group: u32 },
    Save { path: PathBuf },
    Export { path: PathBuf },
    Help,
    Quit,
}

fn parse_group(value: Option<&str>) -> std::result::Result<u32, String> {
    let value = value.ok_or_else(|| "missing group number".to_string())?;
    value
        .parse()
        .map_err(|_| format!("'{}' is not a group number", value))
}

fn parse_student(value: Option<&str>) -> std::result::Result<String, String> {
    value
        .map(str::to_string)
        .ok_or_else(|| "missing student id".to_string())
}

fn parse_path(value: Option<&str>) -> std::result::Result<PathBuf, String> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| "missing file path".to_string())
}

impl SessionCommand {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb {
            "show" | "ls" => Self::Show,
            "unassigned" => Self::Unassigned,
            "assign" | "a" => Self::Assign {
                student: parse_student(words.next())?,
                group: parse_group(words.next())?,
            },
            "remove" | "rm" => Self::Remove {
                student: parse_student(words.next())?,
                group: parse_group(words.next())?,
            },
            "reorder" => Self::Reorder {
                group: parse_group(words.next())?,
                order: words.by_ref().map(str::to_string).collect(),
            },
            "link" => Self::Link {
                group: parse_group(words.next())?,
            },
            "save" => Self::Save {
                path: parse_path(words.next())?,
            },
            "export" => Self::Export {
                path: parse_path(words.next())?,
            },
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };

        if words.next().is_some() {
            return Err(format!("too many arguments for '{}'", verb));
        }
        Ok(Some(command))
    }
}

fn snapshot(session: &Session) -> Plan {
    Plan::new(Strategy::Manual, session.groups().to_vec())
}

fn show<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    for group in session.groups() {
        writeln!(out, "{}", group.label())?;
        if group.is_over_capacity() {
            writeln!(out, "  ! over capacity")?;
        }
        for (stop, student) in group.students.iter().enumerate() {
            writeln!(out, "  {:>2}. [{}] {}", stop + 1, student.id, student.name)?;
        }
    }
    writeln!(out, "Unassigned: {}", session.unassigned().len())?;
    Ok(())
}

/// Apply one command. Returns `false` when the session should end.
fn apply<W: Write>(
    session: &mut Session,
    command: SessionCommand,
    config: &Config,
    out: &mut W,
) -> Result<bool> {
    match command {
        SessionCommand::Show => show(session, out)?,
        SessionCommand::Unassigned => {
            for student in session.unassigned() {
                writeln!(out, "[{}] {} - {}", student.id, student.name, student.address)?;
            }
            writeln!(out, "{} unassigned", session.unassigned().len())?;
        }
        SessionCommand::Assign { student, group } => match session.assign(&student, group) {
            Ok(placement) => {
                if placement.redirected() {
                    writeln!(
                        out,
                        "Group {} is full; {} seated in group {}",
                        placement.requested, student, placement.group_id
                    )?;
                } else {
                    writeln!(out, "{} seated in group {}", student, placement.group_id)?;
                }
                if let Some(from) = placement.moved_from {
                    writeln!(out, "  (moved from group {})", from)?;
                }
            }
            Err(e) => writeln!(out, "Error: {}", e)?,
        },
        SessionCommand::Remove { student, group } => match session.remove(&student, group) {
            Ok(true) => writeln!(out, "{} removed from group {}", student, group)?,
            Ok(false) => writeln!(out, "{} is not in group {}", student, group)?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        },
        SessionCommand::Reorder { group, order } => match session.reorder(group, &order) {
            Ok(()) => writeln!(out, "Group {} reordered", group)?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        },
        SessionCommand::Link { group } => match session.group(group) {
            Some(g) => match group_route_url(g, config) {
                Ok(Some(url)) => writeln!(out, "{}", url)?,
                Ok(None) => writeln!(out, "Group {} is empty", group)?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            None => writeln!(out, "Error: unknown group {}", group)?,
        },
        SessionCommand::Save { path } => match save_plan(&path, &snapshot(session)) {
            Ok(()) => writeln!(out, "Saved to: {}", path.display())?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        },
        SessionCommand::Export { path } => {
            match export_to_excel(&snapshot(session), config, &path) {
                Ok(()) => writeln!(out, "Exported to: {}", path.display())?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            }
        }
        SessionCommand::Help => writeln!(out, "{}", HELP)?,
        SessionCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Drive a session from `input` until `quit` or end of input
pub fn run_session<R: BufRead, W: Write>(
    session: &mut Session,
    config: &Config,
    input: R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Type 'help' for commands.")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        match SessionCommand::parse(&line) {
            Ok(Some(command)) => {
                tracing::debug!(?command, "session command");
                if !apply(session, command, config, out)? {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => writeln!(out, "Error: {}", message)?,
        }
        write!(out, "> ")?;
        out.flush()?;
    }

    Ok(())
}
