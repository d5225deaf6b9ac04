//! Enumerated parameters passed to the engine as `unsigned int`

use libc::c_uint;
use serde::{Deserialize, Serialize};

/// Differential equation solver used by oscillatory networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solver {
    /// Single Euler-like step, no intermediate points
    #[default]
    Fast,
    /// Classic fourth-order Runge-Kutta
    Rk4,
    /// Runge-Kutta-Fehlberg with adaptive step
    Rkf45,
}

impl Solver {
    pub fn code(self) -> c_uint {
        match self {
            Solver::Fast => 0,
            Solver::Rk4 => 1,
            Solver::Rkf45 => 2,
        }
    }
}

/// How oscillator phases are seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPhases {
    #[default]
    RandomGaussian,
    EquipartitionPhase,
}

impl InitialPhases {
    pub fn code(self) -> c_uint {
        match self {
            InitialPhases::RandomGaussian => 0,
            InitialPhases::EquipartitionPhase => 1,
        }
    }
}

/// Topology of a sync network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    AllToAll,
    GridFour,
    GridEight,
    ListBidir,
    Dynamic,
}

impl ConnectionType {
    pub fn code(self) -> c_uint {
        match self {
            ConnectionType::AllToAll => 0,
            ConnectionType::GridFour => 1,
            ConnectionType::GridEight => 2,
            ConnectionType::ListBidir => 3,
            ConnectionType::Dynamic => 4,
        }
    }
}

/// Neighbourhood of neurons in a self-organizing map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SomConnection {
    #[default]
    GridFour,
    GridEight,
    Honeycomb,
    FuncNeighbor,
}

impl SomConnection {
    pub fn code(self) -> c_uint {
        match self {
            SomConnection::GridFour => 0,
            SomConnection::GridEight => 1,
            SomConnection::Honeycomb => 2,
            SomConnection::FuncNeighbor => 3,
        }
    }
}

/// Initial neuron weight placement in a self-organizing map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SomInit {
    Random,
    RandomCentroid,
    RandomSurface,
    #[default]
    UniformGrid,
}

impl SomInit {
    pub fn code(self) -> c_uint {
        match self {
            SomInit::Random => 0,
            SomInit::RandomCentroid => 1,
            SomInit::RandomSurface => 2,
            SomInit::UniformGrid => 3,
        }
    }
}
