//! Fixed-layout result decoding
//!
//! Clustering and simulation results come back as plain C records rather
//! than tagged packages. Declared counts are checked against their
//! pointers before anything is indexed.

use serde::{Deserialize, Serialize};

use super::error::{MarshalError, MarshalResult};
use super::handle::{ClusteringHandle, DynamicsHandle};
use super::layout::{ClusterRepresentation, ClusteringResult, DynamicResult};

/// Groups of object indices in engine order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterSet {
    pub groups: Vec<Vec<u32>>,
}

impl ClusterSet {
    pub fn new(groups: Vec<Vec<u32>>) -> Self {
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of indices over all groups
    pub fn total_objects(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn into_groups(self) -> Vec<Vec<u32>> {
        self.groups
    }
}

/// Split off the last group, which the density-based algorithms use for
/// unclustered points.
///
/// An empty set yields an empty set and empty noise.
pub fn split_trailing_group_as_noise(mut set: ClusterSet) -> (ClusterSet, Vec<u32>) {
    let noise = set.groups.pop().unwrap_or_default();
    (set, noise)
}

/// Clusters with the noise group separated out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterOutcome {
    pub clusters: Vec<Vec<u32>>,
    /// Present only when noise reporting was requested
    pub noise: Option<Vec<u32>>,
}

impl ClusterOutcome {
    /// Apply the trailing-noise convention and keep the noise only if asked.
    pub fn from_groups(set: ClusterSet, report_noise: bool) -> Self {
        let (clusters, noise) = split_trailing_group_as_noise(set);
        Self {
            clusters: clusters.into_groups(),
            noise: report_noise.then_some(noise),
        }
    }
}

/// Time evolution of an oscillatory network
///
/// Deserialization goes through [`DynamicsTrace::new`], so a stored trace
/// is held to the same invariants as a decoded one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredTrace")]
pub struct DynamicsTrace {
    times: Vec<f64>,
    values: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct StoredTrace {
    times: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl TryFrom<StoredTrace> for DynamicsTrace {
    type Error = MarshalError;

    fn try_from(stored: StoredTrace) -> MarshalResult<Self> {
        Self::new(stored.times, stored.values)
    }
}

impl DynamicsTrace {
    /// Build a trace, checking the parallel-length invariants.
    pub fn new(times: Vec<f64>, values: Vec<Vec<f64>>) -> MarshalResult<Self> {
        if times.is_empty() {
            return Err(MarshalError::MalformedDynamics("no steps recorded".to_string()));
        }
        if times.len() != values.len() {
            return Err(MarshalError::MalformedDynamics(format!(
                "{} timestamps but {} value rows",
                times.len(),
                values.len()
            )));
        }
        let network = values[0].len();
        if network == 0 || values.iter().any(|row| row.len() != network) {
            return Err(MarshalError::MalformedDynamics(
                "value rows must share one non-zero network size".to_string(),
            ));
        }
        Ok(Self { times, values })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Number of recorded steps
    pub fn steps(&self) -> usize {
        self.times.len()
    }

    /// Number of oscillators
    pub fn network_size(&self) -> usize {
        self.values[0].len()
    }

    /// `(time, values)` pairs in step order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64])> {
        self.times
            .iter()
            .copied()
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Values at the final step
    pub fn last_state(&self) -> &[f64] {
        &self.values[self.values.len() - 1]
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<Vec<f64>>) {
        (self.times, self.values)
    }
}

impl ClusteringHandle<'_> {
    /// Decode the groups. A null handle yields an empty set.
    pub fn decode_clusters(&self) -> MarshalResult<ClusterSet> {
        let result = match self.record() {
            // Safety: the guard owns a live clustering result.
            Some(record) => unsafe { read_clusters(record) },
            None => Ok(ClusterSet::default()),
        };
        match &result {
            Ok(set) => tracing::debug!(
                groups = set.len(),
                objects = set.total_objects(),
                "decoded clustering result"
            ),
            Err(e) => tracing::warn!(error = %e, "clustering result rejected"),
        }
        result
    }

    pub fn decode_clusters_and_release(self) -> MarshalResult<ClusterSet> {
        self.decode_clusters()
    }
}

unsafe fn read_clusters(record: &ClusteringResult) -> MarshalResult<ClusterSet> {
    let count = record.number_clusters as usize;
    if count == 0 {
        return Ok(ClusterSet::default());
    }
    if record.pointer_clusters.is_null() {
        return Err(MarshalError::MalformedClusters(format!(
            "{} clusters declared without a cluster array",
            count
        )));
    }

    let clusters: &[ClusterRepresentation] =
        std::slice::from_raw_parts(record.pointer_clusters.cast_const(), count);

    let mut groups = Vec::with_capacity(count);
    for (index, cluster) in clusters.iter().enumerate() {
        let objects = cluster.number_objects as usize;
        if objects == 0 {
            groups.push(Vec::new());
            continue;
        }
        if cluster.pointer_objects.is_null() {
            return Err(MarshalError::MalformedClusters(format!(
                "cluster {} declares {} objects without an index array",
                index, objects
            )));
        }
        let indices = std::slice::from_raw_parts(cluster.pointer_objects.cast_const(), objects);
        groups.push(indices.to_vec());
    }

    Ok(ClusterSet::new(groups))
}

impl DynamicsHandle<'_> {
    /// Decode the trace. Zero steps or a null handle mean the simulation
    /// did not run and are reported as [`MarshalError::MalformedDynamics`].
    pub fn decode_dynamics(&self) -> MarshalResult<DynamicsTrace> {
        let result = match self.record() {
            // Safety: the guard owns a live dynamics result.
            Some(record) => unsafe { read_dynamics(record) },
            None => Err(MarshalError::MalformedDynamics(
                "engine returned no dynamics".to_string(),
            )),
        };
        match &result {
            Ok(trace) => tracing::debug!(
                steps = trace.steps(),
                network = trace.network_size(),
                "decoded dynamics"
            ),
            Err(e) => tracing::warn!(error = %e, "dynamics result rejected"),
        }
        result
    }

    pub fn decode_dynamics_and_release(self) -> MarshalResult<DynamicsTrace> {
        self.decode_dynamics()
    }
}

unsafe fn read_dynamics(record: &DynamicResult) -> MarshalResult<DynamicsTrace> {
    let steps = record.size_dynamic as usize;
    let network = record.size_network as usize;

    if steps == 0 || network == 0 {
        return Err(MarshalError::MalformedDynamics(format!(
            "declared {} steps over {} oscillators",
            steps, network
        )));
    }
    if record.times.is_null() || record.dynamic.is_null() {
        return Err(MarshalError::MalformedDynamics(
            "missing time axis or value rows".to_string(),
        ));
    }

    let times = std::slice::from_raw_parts(record.times.cast_const(), steps).to_vec();
    let rows = std::slice::from_raw_parts(record.dynamic.cast_const(), steps);

    let mut values = Vec::with_capacity(steps);
    for (step, &row) in rows.iter().enumerate() {
        if row.is_null() {
            return Err(MarshalError::MalformedDynamics(format!(
                "step {} has no values",
                step
            )));
        }
        values.push(std::slice::from_raw_parts(row.cast_const(), network).to_vec());
    }

    DynamicsTrace::new(times, values)
}
