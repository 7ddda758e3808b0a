//! Simulated processes and the process registry

use super::{format_size, Address};
use rustc_hash::FxHashMap;
use std::fmt;

/// Unique, monotonically assigned process identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u32);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The memory region currently backing an allocated process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    /// Index of the fixed partition
    Partition(usize),
    /// Start address of the dynamic block
    Block(Address),
}

impl fmt::Display for Backing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backing::Partition(index) => write!(f, "partition {}", index),
            Backing::Block(start) => write!(f, "block @ 0x{:08x}", start),
        }
    }
}

/// A simulated process requesting memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    pub size: u64,
    backing: Option<Backing>, // Some iff allocated
}

impl Process {
    pub fn new(id: ProcessId, name: String, size: u64) -> Self {
        Process {
            id,
            name,
            size,
            backing: None,
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.backing.is_some()
    }

    pub fn backing(&self) -> Option<Backing> {
        self.backing
    }

    pub(crate) fn assign(&mut self, backing: Backing) {
        self.backing = Some(backing);
    }

    pub(crate) fn unassign(&mut self) {
        self.backing = None;
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, format_size(self.size))
    }
}

/// Creation-ordered set of processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    processes: Vec<Process>,
    index: FxHashMap<ProcessId, usize>,
    next_id: u32,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new process of `size` bytes and return its id.
    /// Names follow the id: `P1`, `P2`, ...
    pub fn register(&mut self, size: u64) -> ProcessId {
        self.next_id += 1;
        let id = ProcessId(self.next_id);
        let process = Process::new(id, format!("P{}", self.next_id), size);
        self.index.insert(id, self.processes.len());
        self.processes.push(process);
        id
    }

    pub fn get(&self, id: ProcessId) -> Option<&Process> {
        self.index.get(&id).map(|&i| &self.processes[i])
    }

    pub fn get_mut(&mut self, id: ProcessId) -> Option<&mut Process> {
        match self.index.get(&id) {
            Some(&i) => self.processes.get_mut(i),
            None => None,
        }
    }

    /// Name of the process with `id`, if registered
    pub fn name_of(&self, id: ProcessId) -> Option<&str> {
        self.get(id).map(|p| p.name.as_str())
    }

    /// Clear every process's allocation
    pub fn unassign_all(&mut self) {
        for process in &mut self.processes {
            process.unassign();
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Process> {
        self.processes.iter()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}
