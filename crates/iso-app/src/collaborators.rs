//! External programs: the parallel ocean model, the graph partitioner and
//! the mesh tools.

use std::path::{Path, PathBuf};
use std::process::Command;

use iso_project::{ExecutionConfig, Stage};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

pub const MESH_INPUT: &str = "base_mesh.nc";
pub const MESH_FILE: &str = "mesh.nc";
pub const GRAPH_FILE: &str = "graph.info";
pub const OCEAN_FILE: &str = "ocean.nc";
pub const CULLED_MESH_FILE: &str = "culled_mesh.nc";
pub const CULLED_GRAPH_FILE: &str = "culled_graph.info";

/// One invocation of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Set on the child only.
    pub env: Vec<(String, String)>,
    pub cwd: PathBuf,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Launches external programs and waits for them.
pub trait ProcessRunner {
    /// A nonzero exit status is an error.
    fn run(&mut self, command: &ToolCommand) -> AppResult<()>;
}

/// Runs commands as child processes of this one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, command: &ToolCommand) -> AppResult<()> {
        debug!(cmd = %command.command_line(), cwd = %command.cwd.display(), "spawning");
        let status = Command::new(&command.program)
            .args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&command.cwd)
            .status()
            .map_err(|source| AppError::Spawn {
                program: command.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(AppError::Collaborator {
                program: command.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Builds collaborator command lines for one work directory.
#[derive(Debug, Clone)]
pub struct Collaborators<'a> {
    execution: &'a ExecutionConfig,
    work_dir: &'a Path,
}

impl<'a> Collaborators<'a> {
    pub fn new(execution: &'a ExecutionConfig, work_dir: &'a Path) -> Self {
        Self {
            execution,
            work_dir,
        }
    }

    /// `<parallel> -n <cores> <model> -n <namelist> -s <streams>`.
    pub fn forward_model(&self, stage: Stage) -> ToolCommand {
        let e = self.execution;
        ToolCommand::new(&e.parallel_executable, self.work_dir)
            .arg("-n")
            .arg(e.resources(stage).cores.to_string())
            .arg(&e.model_executable)
            .arg("-n")
            .arg(&e.namelist)
            .arg("-s")
            .arg(&e.streams)
            .env("OMP_NUM_THREADS", e.omp_threads.to_string())
    }

    pub fn partition(&self, stage: Stage) -> ToolCommand {
        ToolCommand::new(&self.execution.partitioner, self.work_dir)
            .arg(GRAPH_FILE)
            .arg(self.execution.resources(stage).cores.to_string())
    }

    pub fn convert_mesh(&self) -> ToolCommand {
        ToolCommand::new(&self.execution.mesh_converter, self.work_dir)
            .arg(MESH_INPUT)
            .arg(MESH_FILE)
    }

    pub fn cull_cells(&self) -> ToolCommand {
        ToolCommand::new(&self.execution.cell_culler, self.work_dir)
            .arg(OCEAN_FILE)
            .arg(CULLED_MESH_FILE)
    }
}

/// Run the forward model with start/finish banners in the log.
pub fn run_model(runner: &mut dyn ProcessRunner, tools: &Collaborators<'_>, stage: Stage) -> AppResult<()> {
    let cmd = tools.forward_model(stage);
    info!(stage = %stage, cmd = %cmd.command_line(), "Starting model run step");
    runner.run(&cmd)?;
    info!(stage = %stage, "Finished model run step");
    Ok(())
}
