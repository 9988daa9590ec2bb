//! Command tree

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn step_arg() -> Arg {
    Arg::new("step")
        .long("step")
        .default_value("1")
        .value_parser(value_parser!(u8).range(1..=3))
        .help("Snowflake step to work on")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(u64))
        .help("Stored character id")
}

fn name_arg(required: bool) -> Arg {
    Arg::new("name")
        .long("name")
        .required(required)
        .help("Character name")
}

fn summary_arg(required: bool) -> Arg {
    Arg::new("summary")
        .long("summary")
        .required(required)
        .help("Character summary, at most 280 characters")
}

pub(crate) fn build() -> Command {
    Command::new("quill")
        .version(quill_core::VERSION)
        .about("Snowflake story assistant")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .default_value("quill.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Override the data directory"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("JSON logs and JSON listings"),
        )
        .subcommand(
            Command::new("characters")
                .about("Manage the character list")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("Show all characters"))
                .subcommand(
                    Command::new("add")
                        .about("Add a character")
                        .arg(name_arg(true))
                        .arg(summary_arg(true)),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Replace a character's name and summary")
                        .arg(id_arg())
                        .arg(name_arg(true))
                        .arg(summary_arg(true)),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Delete a character")
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("ask")
                .about("Run an assistant task on a step")
                .arg(
                    Arg::new("task")
                        .required(true)
                        .value_parser(["generate", "brainstorm", "refine"])
                        .help("Task to run"),
                )
                .arg(step_arg())
                .arg(
                    Arg::new("query")
                        .long("query")
                        .help("Ask this instead of the built-in prompt"),
                ),
        )
        .subcommand(
            Command::new("suggest")
                .about("Suggest characters from steps 1 and 2")
                .arg(
                    Arg::new("adopt")
                        .long("adopt")
                        .action(ArgAction::SetTrue)
                        .help("Add every suggestion to the character list"),
                ),
        )
        .subcommand(
            Command::new("step")
                .about("Read or write step text")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print a step").arg(step_arg()))
                .subcommand(
                    Command::new("set")
                        .about("Replace and save a step's text")
                        .arg(step_arg())
                        .arg(Arg::new("text").required(true).help("New text")),
                ),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Quick save and quick load")
                .subcommand_required(true)
                .subcommand(
                    Command::new("save")
                        .about("Save all steps")
                        .arg(step_arg()),
                )
                .subcommand(Command::new("load").about("Restore the quick save")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = build()
            .try_get_matches_from(["quill", "characters", "list", "--json", "--data-dir", "/tmp/q"])
            .unwrap();

        assert!(matches.get_flag("json"));
        assert_eq!(
            matches.get_one::<PathBuf>("data-dir"),
            Some(&PathBuf::from("/tmp/q"))
        );
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("quill.toml"))
        );
    }

    #[test]
    fn ask_rejects_character_task() {
        assert!(build()
            .try_get_matches_from(["quill", "ask", "suggest-characters"])
            .is_err());
    }

    #[test]
    fn step_out_of_range_is_rejected() {
        assert!(build()
            .try_get_matches_from(["quill", "step", "show", "--step", "4"])
            .is_err());
    }

    #[test]
    fn add_requires_both_fields() {
        assert!(build()
            .try_get_matches_from(["quill", "characters", "add", "--name", "Ava"])
            .is_err());
    }
}
