//! `BatchSpec` — the parameter space of a sweep.

use std::collections::BTreeMap;

use abm_engine::Value;

// ── SweepValue ────────────────────────────────────────────────────────────────

/// One parameter's role in the sweep: held constant, or enumerated.
#[derive(Debug, Clone)]
pub enum SweepValue {
    Fixed(Value),
    List(Vec<Value>),
}

// ── BatchSpec ─────────────────────────────────────────────────────────────────

/// A mapping from parameter name to fixed value or candidate list.
///
/// Expansion enumerates the full Cartesian product of the list-valued
/// parameters, fixed parameters held constant.  Names are kept in a
/// `BTreeMap`, so enumeration order — and therefore run-ID assignment — is
/// deterministic regardless of insertion order.
///
/// ```rust,ignore
/// let spec = BatchSpec::new()
///     .fixed("population", 100i64)
///     .sweep("infection_rate", [0.05, 0.1, 0.2])
///     .sweep("n_initial_infections", [1i64, 5]);
/// assert_eq!(spec.combinations().len(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchSpec {
    entries: BTreeMap<String, SweepValue>,
}

impl BatchSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `name` constant at `value` across every combination.
    pub fn fixed(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), SweepValue::Fixed(value.into()));
        self
    }

    /// Enumerate `name` over `values`.
    ///
    /// An empty list makes the product empty: zero combinations.
    pub fn sweep<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.entries.insert(
            name.into(),
            SweepValue::List(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Number of declared parameters (fixed and swept).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The list-valued parameter names, in deterministic (name) order.
    pub fn swept_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, v)| matches!(v, SweepValue::List(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Expand into the full Cartesian product of concrete combinations.
    ///
    /// With list sizes `s1..sk` the result has `s1 × … × sk` entries; a spec
    /// with no lists yields exactly one all-fixed combination.
    pub fn combinations(&self) -> Vec<Combination> {
        let mut fixed: Vec<(&str, &Value)> = Vec::new();
        let mut lists: Vec<(&str, &[Value])> = Vec::new();
        for (name, entry) in &self.entries {
            match entry {
                SweepValue::Fixed(v) => fixed.push((name, v)),
                SweepValue::List(vs) => lists.push((name, vs)),
            }
        }

        // An empty list zeroes the product: no combinations at all.
        let total: usize = lists.iter().map(|(_, vs)| vs.len()).product();

        let mut combos = Vec::with_capacity(total);
        let mut cursor = vec![0usize; lists.len()];
        for index in 0..total {
            let mut assignments: Vec<(String, Value)> = fixed
                .iter()
                .map(|(name, v)| (name.to_string(), (*v).clone()))
                .collect();
            let mut swept = Vec::with_capacity(lists.len());
            for (slot, &(name, values)) in lists.iter().enumerate() {
                let value = values[cursor[slot]].clone();
                assignments.push((name.to_string(), value.clone()));
                swept.push(value);
            }
            combos.push(Combination { index, assignments, swept });

            // Odometer increment, last slot fastest.
            for slot in (0..cursor.len()).rev() {
                cursor[slot] += 1;
                if cursor[slot] < lists[slot].1.len() {
                    break;
                }
                cursor[slot] = 0;
            }
        }
        combos
    }
}

// ── Combination ───────────────────────────────────────────────────────────────

/// One concrete point of the parameter space.
#[derive(Debug, Clone)]
pub struct Combination {
    /// Position in the deterministic enumeration order.
    pub index: usize,
    /// Every declared parameter with its concrete value (fixed first, then
    /// swept, each group in name order).
    pub assignments: Vec<(String, Value)>,
    /// The swept parameters' values only, aligned with
    /// [`BatchSpec::swept_names`].  These tag every output row.
    pub swept: Vec<Value>,
}
