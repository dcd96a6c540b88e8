//! Explicit load sequences for replaying fragments into a catalog.
//!
//! A browser decides when fragment scripts run relative to the page's own
//! initialisation. Here that decision is data: a `LoadPlan` lists the
//! submissions and the single page-ready signal in the order they happen, so
//! callers (the CLI, tests) can put activation anywhere in the sequence and
//! check that the merged result does not depend on it.

use crate::catalog::Catalog;
use crate::fragment::Fragment;
use anyhow::{Result, bail};
use std::env;
use tracing::debug;

pub const ENV_LOAD_ORDER: &str = "IMPLEMENTORS_ORDER";
pub const ENV_ACTIVATE_AFTER: &str = "IMPLEMENTORS_ACTIVATE_AFTER";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadOrder {
    /// Fragments run in sorted path order.
    #[default]
    Discovered,
    /// Fragments run in reverse path order.
    Reverse,
}

impl LoadOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadOrder::Discovered => "discovered",
            LoadOrder::Reverse => "reverse",
        }
    }
}

impl TryFrom<&str> for LoadOrder {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "discovered" => Ok(LoadOrder::Discovered),
            "reverse" => Ok(LoadOrder::Reverse),
            other => bail!("Unknown load order: {other}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    /// Run the fragment at this index of the loaded set.
    Submit(usize),
    /// The page signals that its registries can be created.
    Activate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadPlan {
    events: Vec<LoadEvent>,
}

impl LoadPlan {
    /// Plan `fragment_count` submissions in `order`, with the page-ready
    /// signal after `activate_after` of them (clamped). `None` means the page
    /// becomes ready only after every fragment ran.
    pub fn new(fragment_count: usize, order: LoadOrder, activate_after: Option<usize>) -> Self {
        let mut indices: Vec<usize> = (0..fragment_count).collect();
        if order == LoadOrder::Reverse {
            indices.reverse();
        }
        let activate_at = activate_after
            .unwrap_or(fragment_count)
            .min(fragment_count);

        let mut events = Vec::with_capacity(fragment_count + 1);
        for (position, index) in indices.into_iter().enumerate() {
            if position == activate_at {
                events.push(LoadEvent::Activate);
            }
            events.push(LoadEvent::Submit(index));
        }
        if activate_at == fragment_count {
            events.push(LoadEvent::Activate);
        }
        Self { events }
    }

    pub fn events(&self) -> &[LoadEvent] {
        &self.events
    }

    /// Run the plan against `catalog`.
    ///
    /// The ready signal activates every page that exists at that moment;
    /// pages first seen afterwards are created direct by the catalog.
    pub fn apply(&self, fragments: &[Fragment], catalog: &mut Catalog) -> Result<()> {
        for event in &self.events {
            match *event {
                LoadEvent::Submit(index) => {
                    let Some(fragment) = fragments.get(index) else {
                        bail!(
                            "load plan references fragment {index}, only {} loaded",
                            fragments.len()
                        );
                    };
                    debug!(path = %fragment.path.display(), "running fragment");
                    for contribution in &fragment.contributions {
                        catalog.submit(&fragment.interface, contribution.clone());
                    }
                }
                LoadEvent::Activate => {
                    let activated = catalog.activate_all();
                    debug!(activated, "page ready");
                }
            }
        }
        Ok(())
    }
}

pub fn load_order_from_env() -> Result<Option<LoadOrder>> {
    match env_non_empty(ENV_LOAD_ORDER) {
        Some(raw) => LoadOrder::try_from(raw.as_str()).map(Some),
        None => Ok(None),
    }
}

pub fn activate_after_from_env() -> Result<Option<usize>> {
    match env_non_empty(ENV_ACTIVATE_AFTER) {
        Some(raw) => match raw.parse::<usize>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => bail!("{ENV_ACTIVATE_AFTER} must be a non-negative integer, got '{raw}'"),
        },
        None => Ok(None),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InterfacePath;
    use crate::descriptor::{Contribution, Descriptor, LibraryKey};
    use std::path::PathBuf;

    fn fragment(name: &str, library: &str, descriptors: &[&str]) -> Fragment {
        Fragment {
            path: PathBuf::from(name),
            interface: InterfacePath::parse("core::fmt::Display").unwrap(),
            contributions: vec![Contribution::new(library, descriptors.iter().copied())],
        }
    }

    #[test]
    fn default_plan_activates_last() {
        let plan = LoadPlan::new(2, LoadOrder::Discovered, None);
        assert_eq!(
            plan.events(),
            &[
                LoadEvent::Submit(0),
                LoadEvent::Submit(1),
                LoadEvent::Activate
            ]
        );
    }

    #[test]
    fn activation_can_come_first_or_between() {
        assert_eq!(
            LoadPlan::new(2, LoadOrder::Discovered, Some(0)).events(),
            &[
                LoadEvent::Activate,
                LoadEvent::Submit(0),
                LoadEvent::Submit(1)
            ]
        );
        assert_eq!(
            LoadPlan::new(2, LoadOrder::Reverse, Some(1)).events(),
            &[
                LoadEvent::Submit(1),
                LoadEvent::Activate,
                LoadEvent::Submit(0)
            ]
        );
    }

    #[test]
    fn activation_point_is_clamped() {
        let plan = LoadPlan::new(1, LoadOrder::Discovered, Some(10));
        assert_eq!(plan.events(), &[LoadEvent::Submit(0), LoadEvent::Activate]);
        let empty = LoadPlan::new(0, LoadOrder::Discovered, None);
        assert_eq!(empty.events(), &[LoadEvent::Activate]);
    }

    #[test]
    fn apply_merges_regardless_of_activation_point() {
        let fragments = vec![
            fragment("a.js", "petgraph", &["a1", "a2"]),
            fragment("b.js", "petgraph", &["b1"]),
        ];
        let interface = InterfacePath::parse("core::fmt::Display").unwrap();
        let expected: Vec<Descriptor> = ["a1", "a2", "b1"].into_iter().map(Descriptor::from).collect();

        for activate_after in [None, Some(0), Some(1), Some(2)] {
            let mut catalog = Catalog::new();
            LoadPlan::new(fragments.len(), LoadOrder::Discovered, activate_after)
                .apply(&fragments, &mut catalog)
                .unwrap();
            assert_eq!(
                catalog.query(&interface).lookup(&LibraryKey::from("petgraph")),
                expected.as_slice(),
                "activation after {activate_after:?}"
            );
        }
    }

    #[test]
    fn early_ready_signal_forwards_every_fragment_directly() {
        let mut fragments = vec![fragment("a.js", "petgraph", &["a1"])];
        fragments.push(Fragment {
            path: PathBuf::from("b.js"),
            interface: InterfacePath::parse("core::iter::Extend").unwrap(),
            contributions: vec![Contribution::new("petgraph", ["b1"])],
        });
        let mut catalog = Catalog::new();
        LoadPlan::new(fragments.len(), LoadOrder::Discovered, Some(0))
            .apply(&fragments, &mut catalog)
            .unwrap();
        for fragment in &fragments {
            let page = catalog.page(&fragment.interface).unwrap();
            assert!(page.is_direct(), "{}", fragment.interface);
            assert_eq!(page.pending_len(), 0);
        }
    }

    #[test]
    fn apply_rejects_out_of_range_plans() {
        let mut catalog = Catalog::new();
        let plan = LoadPlan::new(3, LoadOrder::Discovered, None);
        assert!(plan.apply(&[], &mut catalog).is_err());
    }

    #[test]
    fn order_parses_known_names() {
        assert_eq!(LoadOrder::try_from("reverse").unwrap(), LoadOrder::Reverse);
        assert_eq!(LoadOrder::Discovered.as_str(), "discovered");
        assert!(LoadOrder::try_from("random").is_err());
    }
}
