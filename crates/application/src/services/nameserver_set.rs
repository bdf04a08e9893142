use delve_dns_domain::Address;
use rustc_hash::FxHashSet;
use std::fmt;

/// Ordered candidate name servers for one remote step.
///
/// `get()` hands out each address at most once, skipping the ones marked
/// failed, so a failover loop over the set always terminates.
#[derive(Debug, Clone, Default)]
pub struct NameServerSet {
    servers: Vec<Address>,
    next: usize,
    failed: FxHashSet<Address>,
}

impl NameServerSet {
    pub fn new(servers: Vec<Address>) -> Self {
        Self {
            servers,
            next: 0,
            failed: FxHashSet::default(),
        }
    }

    /// Next untried address, or `None` once the set is exhausted.
    pub fn get(&mut self) -> Option<Address> {
        while let Some(addr) = self.servers.get(self.next) {
            self.next += 1;
            if !self.failed.contains(addr) {
                return Some(addr.clone());
            }
        }
        None
    }

    /// Demote an address after a server-side failure.
    pub fn fail(&mut self, addr: &Address) {
        self.failed.insert(addr.clone());
    }

    pub fn is_failed(&self, addr: &Address) -> bool {
        self.failed.contains(addr)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

impl From<Vec<Address>> for NameServerSet {
    fn from(servers: Vec<Address>) -> Self {
        Self::new(servers)
    }
}

impl fmt::Display for NameServerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list: Vec<String> = self.servers.iter().map(|a| a.to_string()).collect();
        write!(f, "[{}]", list.join(", "))
    }
}
