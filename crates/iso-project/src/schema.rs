//! Configuration schema for an Ocean0 test case.

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    pub forcing: ForcingConfig,
    pub ssh_adjustment: SshAdjustmentConfig,
    /// Namelist overrides, applied in file order.
    #[serde(default)]
    pub namelist: serde_yaml::Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionConfig {
    pub parallel_executable: String,
    #[serde(default = "default_model_executable")]
    pub model_executable: String,
    #[serde(default = "default_namelist")]
    pub namelist: String,
    #[serde(default = "default_streams")]
    pub streams: String,
    #[serde(default = "default_partitioner")]
    pub partitioner: String,
    #[serde(default = "default_mesh_converter")]
    pub mesh_converter: String,
    #[serde(default = "default_cell_culler")]
    pub cell_culler: String,
    #[serde(default = "default_omp_threads")]
    pub omp_threads: u32,
    #[serde(default)]
    pub init: StageResources,
    #[serde(default)]
    pub ssh_adjustment: StageResources,
    #[serde(default)]
    pub simulation: StageResources,
    #[serde(default)]
    pub test: StageResources,
}

/// MPI tasks and I/O tasks for one model stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageResources {
    pub cores: u32,
    #[serde(default = "default_pio_tasks")]
    pub pio_tasks: u32,
}

impl Default for StageResources {
    fn default() -> Self {
        Self {
            cores: 1,
            pio_tasks: 1,
        }
    }
}

impl StageResources {
    /// Stride between I/O tasks.
    pub fn pio_stride(&self) -> u32 {
        if self.pio_tasks == 0 {
            0
        } else {
            self.cores / self.pio_tasks
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    SshAdjustment,
    Simulation,
    Test,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::SshAdjustment => "ssh_adjustment",
            Stage::Simulation => "simulation",
            Stage::Test => "test",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExecutionConfig {
    pub fn resources(&self, stage: Stage) -> StageResources {
        match stage {
            Stage::Init => self.init,
            Stage::SshAdjustment => self.ssh_adjustment,
            Stage::Simulation => self.simulation,
            Stage::Test => self.test,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeometryConfig {
    #[serde(default = "default_filter_sigma")]
    pub filter_sigma: f64,
    #[serde(default = "default_min_ice_thickness")]
    pub min_ice_thickness: f64,
    #[serde(default = "default_input_geometry")]
    pub input_geometry: String,
    #[serde(default = "default_processed_geometry")]
    pub processed_geometry: String,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            filter_sigma: default_filter_sigma(),
            min_ice_thickness: default_min_ice_thickness(),
            input_geometry: default_input_geometry(),
            processed_geometry: default_processed_geometry(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForcingConfig {
    #[serde(deserialize_with = "list_or_csv")]
    pub scaling: Vec<f64>,
    #[serde(default, deserialize_with = "optional_list_or_csv")]
    pub years: Option<Vec<u32>>,
}

impl ForcingConfig {
    /// Years paired with `scaling`; `1..=n` unless given explicitly.
    pub fn resolved_years(&self) -> Vec<u32> {
        match &self.years {
            Some(years) => years.clone(),
            None => (1..=self.scaling.len() as u32).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SshAdjustmentConfig {
    pub iteration_count: usize,
    /// `ssh` or `landIcePressure`; checked by validation.
    pub variable_to_modify: String,
}

fn default_model_executable() -> String {
    "./ocean_model".to_string()
}
fn default_namelist() -> String {
    "namelist.ocean".to_string()
}
fn default_streams() -> String {
    "streams.ocean".to_string()
}
fn default_partitioner() -> String {
    "gpmetis".to_string()
}
fn default_mesh_converter() -> String {
    "MpasMeshConverter.x".to_string()
}
fn default_cell_culler() -> String {
    "MpasCellCuller.x".to_string()
}
fn default_omp_threads() -> u32 {
    1
}
fn default_pio_tasks() -> u32 {
    1
}
fn default_filter_sigma() -> f64 {
    2.0
}
fn default_min_ice_thickness() -> f64 {
    100.0
}
fn default_input_geometry() -> String {
    "input_geometry.nc".to_string()
}
fn default_processed_geometry() -> String {
    "input_geometry_processed.nc".to_string()
}

/// Render a namelist override the way the model's namelist expects it.
pub fn namelist_value(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Bool(true) => ".true.".to_string(),
        serde_yaml::Value::Bool(false) => ".false.".to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// A list of numbers given either as a YAML sequence or as a single
/// comma-separated string (`"0.5, 1.0, 1.5"`).
fn list_or_csv<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + std::str::FromStr,
    T::Err: fmt::Display,
{
    struct ListVisitor<T>(std::marker::PhantomData<T>);

    impl<'de, T> Visitor<'de> for ListVisitor<T>
    where
        T: Deserialize<'de> + std::str::FromStr,
        T::Err: fmt::Display,
    {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, a list or a comma-separated string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_csv(v).map_err(E::custom)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut out = Vec::new();
            while let Some(item) = seq.next_element()? {
                out.push(item);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(ListVisitor(std::marker::PhantomData))
}

fn optional_list_or_csv<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + std::str::FromStr,
    T::Err: fmt::Display,
{
    list_or_csv(deserializer).map(Some)
}

pub fn parse_csv<T>(text: &str) -> Result<Vec<T>, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(|e| format!("'{s}': {e}")))
        .collect()
}
