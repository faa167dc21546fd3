//!
//! # Dependency Ordering
//!
//! Device hierarchies are graphs: a device references other device definitions,
//! which reference others in turn. Writers such as GDSII require every referenced
//! definition to appear before its first user. [DepOrder] produces that order.
//!

// Std-Lib
use std::collections::HashSet;
use std::marker::PhantomData;

///
/// # Dependency-Ordering Trait
///
/// Implementers provide `process`, which pushes each direct dependency of `item`
/// onto the [DepOrderer], and `cycle`, which reports a dependency cycle through `item`.
/// [DepOrder::order] then returns all reachable items, dependencies first.
///
/// ```text
/// struct DeviceOrder;
/// impl DepOrder for DeviceOrder {
///     type Item = DeviceRef;
///     type Error = LayoutError;
///     fn process(item: &DeviceRef, orderer: &mut DepOrderer<Self>) -> LayoutResult<()> {
///         for inst in item.insts.iter() {
///             orderer.push(&inst.device_ref())?;
///         }
///         Ok(())
///     }
///     fn cycle(item: &DeviceRef) -> LayoutError {
///         LayoutError::msg(format!("cycle through {}", item.name))
///     }
/// }
/// ```
///
pub trait DepOrder: Sized {
    /// Item Type. Typically a hashable handle to a node in the dependency graph.
    type Item: Clone + Eq + std::hash::Hash;
    /// Error Type
    type Error;

    /// Dependency-order all entries in slice `items`, and everything they reach
    fn order(items: &[Self::Item]) -> Result<Vec<Self::Item>, Self::Error> {
        DepOrderer::<Self>::order(items)
    }
    /// Process a single `item`, pushing each of its direct dependencies
    fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error>;
    /// Create the error for a dependency cycle detected at `item`
    fn cycle(item: &Self::Item) -> Self::Error;
}

/// # Dependency Order Helper
/// Public solely for use in the call-signature of [DepOrder::process].
pub struct DepOrderer<P: DepOrder> {
    /// Ordered, completed items
    stack: Vec<P::Item>,
    /// Completed items, for quick membership tests
    seen: HashSet<P::Item>,
    /// Items with open recursive frames, for cycle detection
    pending: HashSet<P::Item>,
    p: PhantomData<P>,
}
impl<P: DepOrder> DepOrderer<P> {
    /// Dependency-order all entries in slice `items`
    pub fn order(items: &[P::Item]) -> Result<Vec<P::Item>, P::Error> {
        let mut this = Self {
            stack: Vec::with_capacity(items.len()),
            seen: HashSet::with_capacity(items.len()),
            pending: HashSet::new(),
            p: PhantomData,
        };
        for item in items.iter() {
            this.push(item)?;
        }
        Ok(this.stack)
    }
    /// Push `item`'s dependencies, and then itself, onto the stack.
    /// Items already pushed are skipped, so shared dependencies appear once.
    pub fn push(&mut self, item: &P::Item) -> Result<(), P::Error> {
        if self.seen.contains(item) {
            return Ok(());
        }
        if !self.pending.insert(item.clone()) {
            return Err(P::cycle(item));
        }
        P::process(item, self)?;
        self.pending.remove(item);
        self.seen.insert(item.clone());
        self.stack.push(item.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Small name-keyed graph, stored in a thread-local so `process` can reach it
    struct NameOrder;
    thread_local! {
        static GRAPH: std::cell::RefCell<HashMap<&'static str, Vec<&'static str>>> = Default::default();
    }
    impl DepOrder for NameOrder {
        type Item = &'static str;
        type Error = String;
        fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), String> {
            let deps = GRAPH.with(|g| g.borrow().get(item).cloned().unwrap_or_default());
            for dep in deps.iter() {
                orderer.push(dep)?;
            }
            Ok(())
        }
        fn cycle(item: &Self::Item) -> String {
            format!("cycle at {}", item)
        }
    }
    fn set_graph(edges: Vec<(&'static str, Vec<&'static str>)>) {
        GRAPH.with(|g| {
            let mut g = g.borrow_mut();
            g.clear();
            g.extend(edges);
        });
    }

    #[test]
    fn dependencies_first() -> Result<(), String> {
        set_graph(vec![
            ("top", vec!["pad", "meander"]),
            ("meander", vec!["hairpin"]),
            ("pad", vec![]),
        ]);
        let order = NameOrder::order(&["top", "hairpin"])?;
        assert_eq!(order, vec!["pad", "hairpin", "meander", "top"]);
        Ok(())
    }
    #[test]
    fn shared_dependency_once() -> Result<(), String> {
        set_graph(vec![("a", vec!["c"]), ("b", vec!["c"])]);
        let order = NameOrder::order(&["a", "b"])?;
        assert_eq!(order, vec!["c", "a", "b"]);
        Ok(())
    }
    #[test]
    fn detects_cycles() {
        set_graph(vec![("a", vec!["b"]), ("b", vec!["a"])]);
        assert_eq!(NameOrder::order(&["a"]), Err("cycle at a".to_string()));
    }
}
