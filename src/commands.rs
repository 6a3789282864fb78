//! Command registry backing the generated CLI
//!
//! Every model implementation exported by a package becomes a command group
//! named after its class. Each group carries the same static table of
//! lifecycle commands, each a typed handler run against a fresh model
//! instance.

use crate::models::{ModelError, ModelInterface};
use crate::plugins::{ModelFactory, PluginCatalog};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors produced while running a CLI command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Unknown command group '{0}'")]
    UnknownGroup(String),

    #[error("Unknown command '{command}' for {group}")]
    UnknownCommand { group: String, command: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Typed command handler
pub type CommandHandler = fn(&mut dyn ModelInterface, &[String]) -> Result<String, CommandError>;

/// One lifecycle command
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub about: &'static str,
    /// Positional argument synopsis shown in help and usage errors
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// Lifecycle commands exposed for every model
pub const LIFECYCLE_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "extract",
        about: "Parse raw data (inline rows or a CSV path)",
        usage: "<data>",
        handler: extract,
    },
    CommandSpec {
        name: "load",
        about: "Extract, transform and load data for training",
        usage: "<data>",
        handler: load,
    },
    CommandSpec {
        name: "load_model",
        about: "Load a saved model",
        usage: "<model_path>",
        handler: load_model,
    },
    CommandSpec {
        name: "predict",
        about: "Predict targets, loading a saved model first when a path is given",
        usage: "<features> [model_path]",
        handler: predict,
    },
    CommandSpec {
        name: "retrain",
        about: "Retrain a saved model on new data and save it back",
        usage: "<data> [model_path]",
        handler: retrain,
    },
    CommandSpec {
        name: "save_model",
        about: "Save the current model",
        usage: "<model_path>",
        handler: save_model,
    },
    CommandSpec {
        name: "train",
        about: "Train on data, saving the model when a path is given",
        usage: "<data> [model_path]",
        handler: train,
    },
    CommandSpec {
        name: "transform",
        about: "Split data into features and target (last column)",
        usage: "<data>",
        handler: transform,
    },
];

fn arity(
    command: &str,
    usage: &str,
    args: &[String],
    min: usize,
    max: usize,
) -> Result<(), CommandError> {
    if args.len() < min || args.len() > max {
        return Err(CommandError::Usage(format!(
            "{} {} (got {} arguments)",
            command,
            usage,
            args.len()
        )));
    }
    Ok(())
}

fn prepare(
    model: &mut dyn ModelInterface,
    raw: &str,
) -> Result<(crate::models::Matrix, Vec<f64>), CommandError> {
    let data = model.extract(raw)?;
    let (features, target) = model.transform(data)?;
    Ok(model.load(features, target)?)
}

fn extract(model: &mut dyn ModelInterface, args: &[String]) -> Result<String, CommandError> {
    arity("extract", "<data>", args, 1, 1)?;
    Ok(format!("{:?}", model.extract(&args[0])?))
}

fn transform(model: &mut dyn ModelInterface, args: &[String]) -> Result<String, CommandError> {
    arity("transform", "<data>", args, 1, 1)?;
    let data = model.extract(&args[0])?;
    Ok(format!("{:?}", model.transform(data)?))
}

fn load(model: &mut dyn ModelInterface, args: &[String]) -> Result<String, CommandError> {
    arity("load", "<data>", args, 1, 1)?;
    Ok(format!("{:?}", prepare(model, &args[0])?))
}

fn train(model: &mut dyn ModelInterface, args: &[String]) -> Result<String, CommandError> {
    arity("train", "<data> [model_path]", args, 1, 2)?;
    let (features, target) = prepare(model, &args[0])?;
    model.train(&features, &target)?;

    match args.get(1) {
        Some(path) => {
            model.save_model(Path::new(path))?;
            Ok(format!("trained on {} samples, saved to {}", features.len(), path))
        }
        None => Ok(format!("trained on {} samples", features.len())),
    }
}

fn predict(model: &mut dyn ModelInterface, args: &[String]) -> Result<String, CommandError> {
    arity("predict", "<features> [model_path]", args, 1, 2)?;
    if let Some(path) = args.get(1) {
        model.load_model(Path::new(path))?;
    }
    let features = model.extract(&args[0])?;
    Ok(format!("{:?}", model.predict(&features)?))
}

fn save_model(model: &mut dyn ModelInterface, args: &[String]) -> Result<String, CommandError> {
    arity("save_model", "<model_path>", args, 1, 1)?;
    model.save_model(Path::new(&args[0]))?;
    Ok(format!("saved to {}", args[0]))
}

fn load_model(model: &mut dyn ModelInterface, args: &[String]) -> Result<String, CommandError> {
    arity("load_model", "<model_path>", args, 1, 1)?;
    model.load_model(Path::new(&args[0]))?;
    Ok(format!("loaded {} model from {}", model.kind(), args[0]))
}

fn retrain(model: &mut dyn ModelInterface, args: &[String]) -> Result<String, CommandError> {
    arity("retrain", "<data> [model_path]", args, 1, 2)?;
    if let Some(path) = args.get(1) {
        model.load_model(Path::new(path))?;
    }
    let (features, target) = prepare(model, &args[0])?;
    model.retrain(&features, &target)?;

    match args.get(1) {
        Some(path) => {
            model.save_model(Path::new(path))?;
            Ok(format!("retrained on {} samples, saved to {}", features.len(), path))
        }
        None => Ok(format!("retrained on {} samples", features.len())),
    }
}

/// Commands for one model implementation
#[derive(Debug, Clone)]
pub struct CommandGroup {
    name: &'static str,
    package: String,
    factory: ModelFactory,
    commands: &'static [CommandSpec],
}

impl CommandGroup {
    /// Class name of the implementation
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Package that exported the implementation
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn commands(&self) -> &'static [CommandSpec] {
        self.commands
    }

    pub fn command(&self, name: &str) -> Option<&'static CommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Run a command against a fresh model instance
    pub fn run(&self, command: &str, args: &[String]) -> Result<String, CommandError> {
        let spec = self
            .command(command)
            .ok_or_else(|| CommandError::UnknownCommand {
                group: self.name.to_string(),
                command: command.to_string(),
            })?;

        let mut model = (self.factory)();
        tracing::debug!(group = self.name, command, args = ?args, "Running command");
        (spec.handler)(model.as_mut(), args)
    }
}

/// Immutable set of command groups keyed by class name
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    groups: BTreeMap<&'static str, CommandGroup>,
}

impl CommandRegistry {
    /// Build command groups from every package in the catalog
    pub fn discover(catalog: &PluginCatalog) -> Self {
        let mut registry = Self::default();

        for plugin in catalog.iter() {
            let package = plugin.package_name();
            let exports = match plugin.load() {
                Ok(exports) => exports,
                Err(e) => {
                    tracing::error!(package, error = %e, "Failed to load model package");
                    crate::metrics::record_plugin_failed(package);
                    continue;
                }
            };

            if exports.implementations.is_empty() {
                tracing::warn!(package, "No ModelInterface implementations found");
                continue;
            }

            for implementation in exports.implementations {
                let group = CommandGroup {
                    name: implementation.class_name,
                    package: package.to_string(),
                    factory: implementation.factory,
                    commands: LIFECYCLE_COMMANDS,
                };

                if let Some(previous) = registry.groups.insert(implementation.class_name, group) {
                    tracing::warn!(
                        group = implementation.class_name,
                        previous = %previous.package,
                        package,
                        "Command group collision, keeping the last discovered package"
                    );
                }
                tracing::info!(
                    group = implementation.class_name,
                    "Registered command group"
                );
            }
        }

        registry
    }

    pub fn get(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.get(name)
    }

    /// Groups sorted by class name
    pub fn groups(&self) -> impl Iterator<Item = &CommandGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Run `command` of `group` with positional arguments
    pub fn run(&self, group: &str, command: &str, args: &[String]) -> Result<String, CommandError> {
        self.get(group)
            .ok_or_else(|| CommandError::UnknownGroup(group.to_string()))?
            .run(command, args)
    }

    /// Build the clap command tree: one subcommand per group, one per lifecycle command
    pub fn to_clap(&self, root: clap::Command) -> clap::Command {
        self.groups().fold(root, |root, group| {
            let sub = group.commands().iter().fold(
                clap::Command::new(group.name())
                    .about(format!("Lifecycle commands for {}", group.name()))
                    .subcommand_required(true)
                    .arg_required_else_help(true),
                |sub, spec| {
                    sub.subcommand(
                        clap::Command::new(spec.name).about(spec.about).arg(
                            clap::Arg::new("args")
                                .value_name(spec.usage)
                                .num_args(0..)
                                .allow_hyphen_values(true),
                        ),
                    )
                },
            );
            root.subcommand(sub)
        })
    }

    /// Resolve parsed matches into (group, command, args)
    pub fn invocation(matches: &clap::ArgMatches) -> Option<(String, String, Vec<String>)> {
        let (group, group_matches) = matches.subcommand()?;
        let (command, command_matches) = group_matches.subcommand()?;
        let args = command_matches
            .get_many::<String>("args")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        Some((group.to_string(), command.to_string(), args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CommandRegistry {
        CommandRegistry::discover(&PluginCatalog::builtin())
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_groups_from_builtin_catalog() {
        let registry = registry();
        let names: Vec<_> = registry.groups().map(|g| g.name()).collect();
        assert_eq!(names, vec!["DecisionTreeModel", "LinearRegressionModel"]);
        assert_eq!(
            registry.get("DecisionTreeModel").unwrap().package(),
            "model-decision-tree"
        );
    }

    #[test]
    fn test_every_lifecycle_operation_has_a_command() {
        let registry = registry();
        let group = registry.get("LinearRegressionModel").unwrap();
        for name in [
            "extract",
            "transform",
            "load",
            "train",
            "predict",
            "save_model",
            "load_model",
            "retrain",
        ] {
            assert!(group.command(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn test_transform_output() {
        let out = registry()
            .run("DecisionTreeModel", "transform", &args(&["1,2,3;4,5,6"]))
            .unwrap();
        assert_eq!(out, "([[1.0, 2.0], [4.0, 5.0]], [3.0, 6.0])");
    }

    #[test]
    fn test_predict_without_model_is_untrained() {
        let err = registry()
            .run("LinearRegressionModel", "predict", &args(&["1,2"]))
            .unwrap_err();
        assert!(matches!(err, CommandError::Model(ModelError::Untrained)));
    }

    #[test]
    fn test_save_model_on_fresh_instance_fails() {
        let err = registry()
            .run("DecisionTreeModel", "save_model", &args(&["/tmp/never.json"]))
            .unwrap_err();
        assert!(matches!(err, CommandError::Model(ModelError::Untrained)));
    }

    #[test]
    fn test_train_save_predict_across_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lr.json");
        let path = path.to_str().unwrap();
        let registry = registry();

        let out = registry
            .run("LinearRegressionModel", "train", &args(&["1,2;2,4;3,6", path]))
            .unwrap();
        assert!(out.starts_with("trained on 3 samples"));

        let out = registry
            .run("LinearRegressionModel", "predict", &args(&["4", path]))
            .unwrap();
        let predictions: Vec<f64> = out
            .trim_matches(|c| c == '[' || c == ']')
            .split(',')
            .map(|v| v.trim().parse().unwrap())
            .collect();
        assert!((predictions[0] - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_retrain_saves_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        let path = path.to_str().unwrap();
        let registry = registry();

        registry
            .run("DecisionTreeModel", "train", &args(&["0,1;1,1", path]))
            .unwrap();
        registry
            .run("DecisionTreeModel", "retrain", &args(&["0,7;1,7", path]))
            .unwrap();
        let out = registry
            .run("DecisionTreeModel", "predict", &args(&["0.5", path]))
            .unwrap();
        assert_eq!(out, "[7.0]");
    }

    #[test]
    fn test_wrong_arity() {
        let err = registry()
            .run("DecisionTreeModel", "extract", &[])
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));
        assert!(err.to_string().contains("extract <data>"));
    }

    #[test]
    fn test_unknown_group_and_command() {
        let registry = registry();
        assert!(matches!(
            registry.run("KMeansModel", "train", &[]),
            Err(CommandError::UnknownGroup(_))
        ));
        assert!(matches!(
            registry.run("DecisionTreeModel", "fit", &[]),
            Err(CommandError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_clap_tree_parses_invocation() {
        let cli = registry().to_clap(clap::Command::new("modulus"));
        let matches = cli
            .try_get_matches_from(["modulus", "DecisionTreeModel", "predict", "1,2", "m.json"])
            .unwrap();

        let (group, command, args) = CommandRegistry::invocation(&matches).unwrap();
        assert_eq!(group, "DecisionTreeModel");
        assert_eq!(command, "predict");
        assert_eq!(args, vec!["1,2", "m.json"]);
    }

    #[test]
    fn test_clap_rejects_unknown_group() {
        let cli = registry().to_clap(clap::Command::new("modulus"));
        assert!(cli.try_get_matches_from(["modulus", "Nope", "train"]).is_err());
    }
}
