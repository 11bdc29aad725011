//! The published function index: which functions appear in the API reference,
//! under which heading, and the reStructuredText used to generate it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionGroup {
    Statistics,
    Econometrics,
}

impl FunctionGroup {
    pub const ALL: [FunctionGroup; 2] = [FunctionGroup::Statistics, FunctionGroup::Econometrics];

    pub fn title(&self) -> &'static str {
        match self {
            FunctionGroup::Statistics => "Statistics functions",
            FunctionGroup::Econometrics => "Econometrics functions",
        }
    }

    pub fn module(&self) -> &'static str {
        match self {
            FunctionGroup::Statistics => "statistics",
            FunctionGroup::Econometrics => "econometrics",
        }
    }

    pub fn module_path(&self) -> String {
        format!("timeseries_analytics.{}", self.module())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionEntry {
    pub name: &'static str,
    pub group: FunctionGroup,
    pub summary: &'static str,
}

const ENTRIES: &[FunctionEntry] = &[
    FunctionEntry {
        name: "generate_series",
        group: FunctionGroup::Statistics,
        summary: "Random walk of daily observations starting at 100",
    },
    FunctionEntry {
        name: "annualize",
        group: FunctionGroup::Econometrics,
        summary: "Scale a series by the square root of its annualization factor",
    },
    FunctionEntry {
        name: "lag",
        group: FunctionGroup::Econometrics,
        summary: "Shift values forward or backward in time",
    },
    FunctionEntry {
        name: "returns",
        group: FunctionGroup::Econometrics,
        summary: "Simple, logarithmic or absolute returns over a lookback",
    },
    FunctionEntry {
        name: "prices",
        group: FunctionGroup::Econometrics,
        summary: "Price levels rebuilt from a series of returns",
    },
    FunctionEntry {
        name: "diff",
        group: FunctionGroup::Econometrics,
        summary: "Difference between each value and an earlier one",
    },
    FunctionEntry {
        name: "index",
        group: FunctionGroup::Econometrics,
        summary: "Series rebased to start at a given level",
    },
    FunctionEntry {
        name: "volatility",
        group: FunctionGroup::Econometrics,
        summary: "Rolling annualized realized volatility in percent",
    },
    FunctionEntry {
        name: "correlation",
        group: FunctionGroup::Econometrics,
        summary: "Rolling Pearson correlation of two series",
    },
    FunctionEntry {
        name: "beta",
        group: FunctionGroup::Econometrics,
        summary: "Rolling beta of a series against a benchmark",
    },
];

// Naming each function here fails the build if an exported function is renamed or removed.
macro_rules! exported {
    ($module:ident: $($name:ident),* $(,)?) => {
        &[$({
            let _ = crate::$module::$name;
            stringify!($name)
        }),*]
    };
}

const STATISTICS_EXPORTS: &[&str] = exported!(statistics: generate_series);

const ECONOMETRICS_EXPORTS: &[&str] = exported!(
    econometrics: annualize,
    lag,
    returns,
    prices,
    diff,
    index,
    volatility,
    correlation,
    beta,
);

/// Functions each module exposes for the reference pages.
pub fn exported_functions(group: FunctionGroup) -> &'static [&'static str] {
    match group {
        FunctionGroup::Statistics => STATISTICS_EXPORTS,
        FunctionGroup::Econometrics => ECONOMETRICS_EXPORTS,
    }
}

pub fn catalog() -> &'static [FunctionEntry] {
    ENTRIES
}

pub fn group_functions(group: FunctionGroup) -> Vec<&'static str> {
    ENTRIES.iter().filter(|e| e.group == group).map(|e| e.name).collect()
}

/// Renders the index as reStructuredText with one `autosummary` block per group.
pub fn render_index() -> String {
    let mut out = String::new();
    for (position, group) in FunctionGroup::ALL.iter().enumerate() {
        if position > 0 {
            out.push('\n');
        }
        let title = group.title();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}\n{}\n", title, "-".repeat(title.len()));
        let _ = writeln!(out, ".. currentmodule:: {}\n", group.module_path());
        let _ = writeln!(out, ".. autosummary::\n   :toctree: functions\n");
        for name in group_functions(*group) {
            let _ = writeln!(out, "   {}", name);
        }
    }
    out
}

/// Differences between the published index and the functions a module exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// Listed in the index but not exported.
    pub missing: Vec<String>,
    /// Exported but not listed in the index.
    pub unlisted: Vec<String>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.unlisted.is_empty()
    }
}

/// Compares the functions listed under `group` with `exported`.
pub fn check_coverage(group: FunctionGroup, exported: &[&str]) -> CoverageReport {
    let listed: BTreeSet<&str> = group_functions(group).into_iter().collect();
    let exported: BTreeSet<&str> = exported.iter().copied().collect();

    CoverageReport {
        missing: listed.difference(&exported).map(|s| s.to_string()).collect(),
        unlisted: exported.difference(&listed).map(|s| s.to_string()).collect(),
    }
}
