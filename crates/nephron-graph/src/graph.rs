//! The mutable compatibility digraph.
//!
//! Vertices are donor-recipient pairs; a directed edge `u -> v` means the donor
//! of `u` is compatible with the recipient of `v` and carries a transplant
//! score. Non-directed donors (NDDs) live in a separate registry and only hold
//! outgoing edges into the pair pool.
//!
//! Both registries are insertion-ordered arenas: external string names map to
//! contiguous internal indices, and the two maps are exact inverses at all
//! times. Vertex removal compacts the arena, re-numbering survivors while
//! preserving their relative order, so the lowest index is always the oldest
//! surviving vertex.

use crate::error::{Error, Result};
use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// An outgoing edge, stored per source in insertion order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutEdge {
    pub target: usize,
    pub score: f64,
}

/// Insertion-ordered name arena with its inverse lookup map.
#[derive(Debug, Clone, Default)]
struct NameTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl NameTable {
    fn len(&self) -> usize {
        self.names.len()
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    fn insert(&mut self, name: String) -> usize {
        let idx = self.names.len();
        self.index.insert(name.clone(), idx);
        self.names.push(name);
        idx
    }

    /// Drops the given indices and re-numbers survivors in relative order.
    /// Returns `remap[old] = Some(new)` for survivors.
    fn compact(&mut self, doomed: &HashSet<usize>) -> Vec<Option<usize>> {
        let mut remap: Vec<Option<usize>> = vec![None; self.names.len()];
        let mut survivors: Vec<String> = Vec::with_capacity(self.names.len() - doomed.len());
        for (old, name) in self.names.drain(..).enumerate() {
            if doomed.contains(&old) {
                continue;
            }
            remap[old] = Some(survivors.len());
            survivors.push(name);
        }
        self.names = survivors;
        self.index.clear();
        for (i, name) in self.names.iter().enumerate() {
            self.index.insert(name.clone(), i);
        }
        remap
    }
}

/// The exchange pool digraph: pair vertices, NDDs, and scored edges.
///
/// All mutating operations validate their whole batch before committing, so a
/// failed call leaves the graph untouched. The container is `Clone`, which is
/// what policy simulation relies on.
#[derive(Debug, Clone, Default)]
pub struct ExchangeGraph {
    vertices: NameTable,
    ndds: NameTable,

    /// Outgoing pair edges per source vertex, insertion-ordered.
    out: Vec<Vec<OutEdge>>,
    /// Source indices per target vertex, insertion-ordered.
    in_: Vec<Vec<usize>>,
    /// Existence set over `(source, target)` vertex indices.
    edges: HashSet<(usize, usize)>,

    /// Outgoing NDD edges per donor, targets are vertex indices.
    ndd_out: Vec<Vec<OutEdge>>,
    /// Existence set over `(ndd, target)` indices.
    ndd_edges: HashSet<(usize, usize)>,
}

impl ExchangeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn ndd_count(&self) -> usize {
        self.ndds.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn ndd_edge_count(&self) -> usize {
        self.ndd_edges.len()
    }

    pub fn has_vertex(&self, name: &str) -> bool {
        self.vertices.get(name).is_some()
    }

    pub fn has_ndd(&self, name: &str) -> bool {
        self.ndds.get(name).is_some()
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.vertices.get(from), self.vertices.get(to)) {
            (Some(s), Some(t)) => self.edges.contains(&(s, t)),
            _ => false,
        }
    }

    pub fn vertex_index(&self, name: &str) -> Option<usize> {
        self.vertices.get(name)
    }

    pub fn vertex_name(&self, index: usize) -> Option<&str> {
        self.vertices.name(index)
    }

    pub fn ndd_index(&self, name: &str) -> Option<usize> {
        self.ndds.get(name)
    }

    pub fn ndd_name(&self, index: usize) -> Option<&str> {
        self.ndds.name(index)
    }

    /// Vertex names in insertion (arrival) order.
    pub fn vertex_names(&self) -> impl Iterator<Item = &str> {
        self.vertices.names.iter().map(|s| s.as_str())
    }

    /// NDD names in insertion order.
    pub fn ndd_names(&self) -> impl Iterator<Item = &str> {
        self.ndds.names.iter().map(|s| s.as_str())
    }

    pub fn out_edges(&self, vertex: usize) -> &[OutEdge] {
        &self.out[vertex]
    }

    pub fn in_edges(&self, vertex: usize) -> &[usize] {
        &self.in_[vertex]
    }

    pub fn out_degree(&self, vertex: usize) -> usize {
        self.out[vertex].len()
    }

    pub fn in_degree(&self, vertex: usize) -> usize {
        self.in_[vertex].len()
    }

    pub fn ndd_out_edges(&self, ndd: usize) -> &[OutEdge] {
        &self.ndd_out[ndd]
    }

    pub fn edge_score(&self, from: &str, to: &str) -> Option<f64> {
        let s = self.vertices.get(from)?;
        let t = self.vertices.get(to)?;
        self.out[s].iter().find(|e| e.target == t).map(|e| e.score)
    }

    pub fn ndd_edge_score(&self, ndd: &str, to: &str) -> Option<f64> {
        let n = self.ndds.get(ndd)?;
        let t = self.vertices.get(to)?;
        self.ndd_out[n]
            .iter()
            .find(|e| e.target == t)
            .map(|e| e.score)
    }

    /// Outgoing edges of a vertex as `(target name, score)` pairs, in
    /// insertion order. Fails with [`Error::UnknownVertex`] for a name not in
    /// the registry.
    pub fn edges_from(&self, name: &str) -> Result<Vec<(String, f64)>> {
        let Some(s) = self.vertices.get(name) else {
            return Err(Error::UnknownVertex { name: name.to_owned() });
        };
        Ok(self.out[s]
            .iter()
            .map(|e| (self.vertices.names[e.target].clone(), e.score))
            .collect())
    }

    /// Outgoing edges of an NDD as `(target name, score)` pairs, in insertion
    /// order. Fails with [`Error::UnknownNdd`] for a name not in the registry.
    pub fn ndd_edges_from(&self, name: &str) -> Result<Vec<(String, f64)>> {
        let Some(n) = self.ndds.get(name) else {
            return Err(Error::UnknownNdd { name: name.to_owned() });
        };
        Ok(self.ndd_out[n]
            .iter()
            .map(|e| (self.vertices.names[e.target].clone(), e.score))
            .collect())
    }

    /// Adds a batch of scored pair edges, creating unseen vertices in
    /// first-mention order.
    ///
    /// The batch is atomic: if any edge already exists in the graph, or is
    /// repeated within the batch, the whole call fails with
    /// [`Error::DuplicateEdge`] and nothing is created.
    pub fn add_edges(&mut self, edges: &[(String, String, f64)]) -> Result<()> {
        // Validation pass: resolve names against the arena plus the batch's
        // provisional vertices, without touching the graph.
        fn resolve<'a>(
            table: &NameTable,
            provisional: &mut HashMap<&'a str, usize>,
            name: &'a str,
        ) -> usize {
            match table.get(name) {
                Some(idx) => idx,
                None => {
                    let next = table.len() + provisional.len();
                    *provisional.entry(name).or_insert(next)
                }
            }
        }

        let mut provisional: HashMap<&str, usize> = HashMap::default();
        let mut batch: HashSet<(usize, usize)> = HashSet::default();
        for (from, to, _) in edges {
            let s = resolve(&self.vertices, &mut provisional, from);
            let t = resolve(&self.vertices, &mut provisional, to);
            if self.edges.contains(&(s, t)) || !batch.insert((s, t)) {
                return Err(Error::DuplicateEdge {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }

        // Commit pass.
        for (from, to, score) in edges {
            let s = self.intern_vertex(from);
            let t = self.intern_vertex(to);
            self.out[s].push(OutEdge { target: t, score: *score });
            self.in_[t].push(s);
            self.edges.insert((s, t));
        }
        Ok(())
    }

    /// Adds a batch of NDD edges. The donor is created on first mention; the
    /// target must already be a pair vertex.
    ///
    /// Atomic like [`add_edges`](Self::add_edges): an unknown target fails the
    /// batch with [`Error::UnknownVertex`], a repeated donor/target pair with
    /// [`Error::DuplicateEdge`].
    pub fn add_ndd_edges(&mut self, edges: &[(String, String, f64)]) -> Result<()> {
        let mut provisional: HashMap<&str, usize> = HashMap::default();
        let mut batch: HashSet<(usize, usize)> = HashSet::default();
        for (ndd, to, _) in edges {
            let n = match self.ndds.get(ndd) {
                Some(idx) => idx,
                None => {
                    let next = self.ndds.len() + provisional.len();
                    *provisional.entry(ndd.as_str()).or_insert(next)
                }
            };
            let Some(t) = self.vertices.get(to) else {
                return Err(Error::UnknownVertex { name: to.clone() });
            };
            if self.ndd_edges.contains(&(n, t)) || !batch.insert((n, t)) {
                return Err(Error::DuplicateEdge {
                    from: ndd.clone(),
                    to: to.clone(),
                });
            }
        }

        for (ndd, to, score) in edges {
            let n = match self.ndds.get(ndd) {
                Some(idx) => idx,
                None => {
                    let idx = self.ndds.insert(ndd.clone());
                    self.ndd_out.push(Vec::new());
                    idx
                }
            };
            // Validated above.
            let Some(t) = self.vertices.get(to) else {
                continue;
            };
            self.ndd_out[n].push(OutEdge { target: t, score: *score });
            self.ndd_edges.insert((n, t));
        }
        Ok(())
    }

    /// Removes pair edges. Pairs that name an unknown vertex or an absent edge
    /// are skipped, so removal is idempotent.
    pub fn remove_edges(&mut self, pairs: &[(String, String)]) {
        for (from, to) in pairs {
            let (Some(s), Some(t)) = (self.vertices.get(from), self.vertices.get(to)) else {
                continue;
            };
            if !self.edges.remove(&(s, t)) {
                continue;
            }
            self.out[s].retain(|e| e.target != t);
            self.in_[t].retain(|&src| src != s);
        }
    }

    /// Removes pair vertices together with every incident edge, including NDD
    /// edges pointing at them. Unknown names are skipped.
    ///
    /// Survivors keep their relative order and are re-numbered contiguously
    /// from zero. NDD names and indices are not affected.
    pub fn remove_vertices(&mut self, names: &[String]) {
        let doomed: HashSet<usize> = names
            .iter()
            .filter_map(|n| self.vertices.get(n))
            .collect();
        if doomed.is_empty() {
            return;
        }
        let remap = self.vertices.compact(&doomed);

        let survivors = self.vertices.len();
        let mut out: Vec<Vec<OutEdge>> = vec![Vec::new(); survivors];
        let mut in_: Vec<Vec<usize>> = vec![Vec::new(); survivors];
        let mut edges: HashSet<(usize, usize)> = HashSet::default();
        for (old_src, old_edges) in self.out.iter().enumerate() {
            let Some(s) = remap[old_src] else {
                continue;
            };
            for e in old_edges {
                let Some(t) = remap[e.target] else {
                    continue;
                };
                out[s].push(OutEdge { target: t, score: e.score });
                edges.insert((s, t));
            }
        }
        for (s, targets) in out.iter().enumerate() {
            for e in targets {
                in_[e.target].push(s);
            }
        }
        self.out = out;
        self.in_ = in_;
        self.edges = edges;

        let mut ndd_edges: HashSet<(usize, usize)> = HashSet::default();
        for (n, donor_edges) in self.ndd_out.iter_mut().enumerate() {
            donor_edges.retain_mut(|e| match remap[e.target] {
                Some(t) => {
                    e.target = t;
                    ndd_edges.insert((n, t));
                    true
                }
                None => false,
            });
        }
        self.ndd_edges = ndd_edges;
    }

    /// Removes NDDs and their outgoing edges. Unknown names are skipped.
    /// Surviving donors keep their relative order and are re-numbered.
    pub fn remove_ndds(&mut self, names: &[String]) {
        let doomed: HashSet<usize> = names.iter().filter_map(|n| self.ndds.get(n)).collect();
        if doomed.is_empty() {
            return;
        }
        let remap = self.ndds.compact(&doomed);

        let mut ndd_out: Vec<Vec<OutEdge>> = vec![Vec::new(); self.ndds.len()];
        let mut ndd_edges: HashSet<(usize, usize)> = HashSet::default();
        for (old, donor_edges) in self.ndd_out.drain(..).enumerate() {
            let Some(n) = remap[old] else {
                continue;
            };
            for e in &donor_edges {
                ndd_edges.insert((n, e.target));
            }
            ndd_out[n] = donor_edges;
        }
        self.ndd_out = ndd_out;
        self.ndd_edges = ndd_edges;
    }

    fn intern_vertex(&mut self, name: &str) -> usize {
        match self.vertices.get(name) {
            Some(idx) => idx,
            None => {
                let idx = self.vertices.insert(name.to_string());
                self.out.push(Vec::new());
                self.in_.push(Vec::new());
                idx
            }
        }
    }
}
