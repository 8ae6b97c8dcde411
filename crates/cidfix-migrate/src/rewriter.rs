//! Rewriting of linked nodes whose descendants changed.
//!
//! [`DagRewriter::process`] walks the graph below a root in post-order,
//! using an explicit stack instead of recursion so depth is bounded only by
//! memory. Each node gets exactly one decision in the [`MappingTable`]:
//! unchanged, or rewritten to a new identifier. Every parent of a shared
//! child reads the same decision, so structural sharing survives the rewrite.
//!
//! Links to legacy-raw blocks are relabeled with [`rewrite`] directly rather
//! than through the mapping table. This keeps the result independent of
//! whether the raw block itself has been relabeled yet.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use cidfix_store::{DagService, LinkedNode};
use cidfix_types::{rewrite, Cid};

use crate::config::UnreadablePolicy;
use crate::error::{MigrateError, MigrateResult};
use crate::mapping::{Mapping, MappingTable};
use crate::observer::MigrationObserver;

/// Counters for one rewriter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Nodes stored under a new identifier.
    pub rewritten: usize,
    /// Nodes visited with nothing to change.
    pub unchanged: usize,
    /// Nodes that could not be fetched or decoded.
    pub skipped: usize,
    /// Links left alone because they closed a cycle.
    pub cycles: usize,
}

/// A node being visited, with a cursor over its links.
struct Frame {
    cid: Cid,
    node: LinkedNode,
    next: usize,
    changed: bool,
}

impl Frame {
    fn new(cid: Cid, node: LinkedNode) -> Self {
        Self {
            cid,
            node,
            next: 0,
            changed: false,
        }
    }

    fn replace_current(&mut self, cid: Cid) {
        self.node.links[self.next].cid = cid;
        self.changed = true;
        self.next += 1;
    }
}

/// Memoized post-order rewriter over linked nodes.
pub struct DagRewriter<'a> {
    dag: &'a dyn DagService,
    policy: UnreadablePolicy,
    stats: RewriteStats,
}

impl<'a> DagRewriter<'a> {
    pub fn new(dag: &'a dyn DagService, policy: UnreadablePolicy) -> Self {
        Self {
            dag,
            policy,
            stats: RewriteStats::default(),
        }
    }

    pub fn stats(&self) -> RewriteStats {
        self.stats
    }

    /// Decide `root` and every linked node below it that has not been decided
    /// yet, rewriting those whose links changed.
    ///
    /// Identifiers already in `mapping`, and identifiers that are not linked
    /// nodes, are left alone. A node that cannot be loaded gets no mapping
    /// entry, so edges to it stay as they are.
    pub fn process(
        &mut self,
        root: &Cid,
        mapping: &mut MappingTable,
        observer: &mut dyn MigrationObserver,
    ) -> MigrateResult<()> {
        if mapping.has(root) || !root.codec().is_dag_node() {
            return Ok(());
        }
        let Some(node) = self.load(root, observer)? else {
            return Ok(());
        };

        let mut in_progress: HashSet<Cid> = HashSet::new();
        in_progress.insert(root.clone());
        let mut stack = vec![Frame::new(root.clone(), node)];

        while let Some(frame) = stack.last_mut() {
            if frame.next == frame.node.links.len() {
                if let Some(done) = stack.pop() {
                    in_progress.remove(&done.cid);
                    self.finish(done, mapping, observer)?;
                }
                continue;
            }

            let target = frame.node.links[frame.next].cid.clone();
            if target.codec().is_legacy_raw() {
                frame.replace_current(rewrite(&target));
                continue;
            }

            match mapping.status(&target) {
                Mapping::Rewritten(new) => frame.replace_current(new.clone()),
                Mapping::Unchanged => frame.next += 1,
                Mapping::Unprocessed => {
                    if !target.codec().is_dag_node() {
                        frame.next += 1;
                    } else if in_progress.contains(&target) {
                        warn!(
                            node = %frame.cid.short(),
                            target = %target.short(),
                            "link closes a cycle; leaving it unchanged"
                        );
                        self.stats.cycles += 1;
                        frame.next += 1;
                    } else {
                        match self.load(&target, observer)? {
                            Some(child) => {
                                // The parent's cursor stays on this link; it is
                                // re-examined once the child has a decision.
                                in_progress.insert(target.clone());
                                stack.push(Frame::new(target, child));
                            }
                            None => frame.next += 1,
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn load(
        &mut self,
        cid: &Cid,
        observer: &mut dyn MigrationObserver,
    ) -> MigrateResult<Option<LinkedNode>> {
        match self.dag.get(cid) {
            Ok(node) => Ok(Some(node)),
            Err(e) if e.is_unreadable() => match self.policy {
                UnreadablePolicy::Skip => {
                    warn!(cid = %cid.short(), error = %e, "skipping unreadable node");
                    observer.node_skipped(cid, &e);
                    self.stats.skipped += 1;
                    Ok(None)
                }
                UnreadablePolicy::Abort => Err(MigrateError::Unreadable {
                    cid: cid.clone(),
                    source: e,
                }),
            },
            Err(e) => Err(e.into()),
        }
    }

    fn finish(
        &mut self,
        frame: Frame,
        mapping: &mut MappingTable,
        observer: &mut dyn MigrationObserver,
    ) -> MigrateResult<()> {
        if !frame.changed {
            debug!(cid = %frame.cid.short(), "node unchanged");
            mapping.set(frame.cid, None);
            self.stats.unchanged += 1;
            return Ok(());
        }

        let new = self.dag.add(&frame.node)?;
        info!(old = %frame.cid.short(), new = %new.short(), "rewrote node");
        observer.node_rewritten(&frame.cid, &new);
        mapping.set(frame.cid, Some(new));
        self.stats.rewritten += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{Event, NoopObserver, RecordingObserver};
    use cidfix_store::{Block, BlockDagService, BlockStore, InMemoryBlockStore, Link};
    use cidfix_types::Codec;

    fn legacy(store: &InMemoryBlockStore, data: &[u8]) -> Cid {
        let block = Block::new(Codec::LEGACY_RAW, data.to_vec());
        store.put(&block).unwrap();
        block.cid().clone()
    }

    fn node(store: &InMemoryBlockStore, links: &[&Cid]) -> Cid {
        let links = links
            .iter()
            .enumerate()
            .map(|(i, cid)| Link::new(format!("l{i}"), 0, (*cid).clone()))
            .collect();
        BlockDagService::new(store)
            .add(&LinkedNode::new(links, Vec::new()))
            .unwrap()
    }

    fn read(store: &InMemoryBlockStore, cid: &Cid) -> LinkedNode {
        BlockDagService::new(store).get(cid).unwrap()
    }

    // -----------------------------------------------------------------------
    // Basic decisions
    // -----------------------------------------------------------------------

    #[test]
    fn link_to_legacy_raw_is_rewritten() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"r");
        let a = node(&store, &[&raw]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        let mut observer = RecordingObserver::default();
        let mut rewriter = DagRewriter::new(&dag, UnreadablePolicy::Skip);
        rewriter.process(&a, &mut mapping, &mut observer).unwrap();

        let new_a = mapping.get(&a).cloned().expect("a rewritten");
        assert_eq!(read(&store, &new_a).links[0].cid, rewrite(&raw));
        // The raw block itself is not touched by the rewriter.
        assert!(!mapping.has(&raw));
        assert_eq!(
            observer.events,
            vec![Event::NodeRewritten { old: a, new: new_a }]
        );
        assert_eq!(rewriter.stats().rewritten, 1);
    }

    #[test]
    fn node_without_legacy_descendants_is_unchanged() {
        let store = InMemoryBlockStore::new();
        let leaf = Block::new(Codec::RAW, b"fine".to_vec());
        store.put(&leaf).unwrap();
        let a = node(&store, &[leaf.cid()]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        let mut rewriter = DagRewriter::new(&dag, UnreadablePolicy::Skip);
        rewriter.process(&a, &mut mapping, &mut NoopObserver).unwrap();

        assert_eq!(mapping.status(&a), Mapping::Unchanged);
        assert!(!mapping.has(leaf.cid()));
        assert_eq!(rewriter.stats().unchanged, 1);
    }

    #[test]
    fn non_node_roots_are_not_recorded() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"r");

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        DagRewriter::new(&dag, UnreadablePolicy::Skip)
            .process(&raw, &mut mapping, &mut NoopObserver)
            .unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn decided_roots_are_not_revisited() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"r");
        let a = node(&store, &[&raw]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        mapping.set(a.clone(), None);
        let mut rewriter = DagRewriter::new(&dag, UnreadablePolicy::Skip);
        rewriter.process(&a, &mut mapping, &mut NoopObserver).unwrap();

        assert_eq!(mapping.status(&a), Mapping::Unchanged);
        assert_eq!(rewriter.stats(), RewriteStats::default());
    }

    // -----------------------------------------------------------------------
    // Propagation and sharing
    // -----------------------------------------------------------------------

    #[test]
    fn rewrite_propagates_to_ancestors() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"deep");
        let c = node(&store, &[&raw]);
        let b = node(&store, &[&c]);
        let a = node(&store, &[&b]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        DagRewriter::new(&dag, UnreadablePolicy::Skip)
            .process(&a, &mut mapping, &mut NoopObserver)
            .unwrap();

        let new_c = mapping.get(&c).cloned().unwrap();
        let new_b = mapping.get(&b).cloned().unwrap();
        let new_a = mapping.get(&a).cloned().unwrap();
        assert_eq!(read(&store, &new_a).links[0].cid, new_b);
        assert_eq!(read(&store, &new_b).links[0].cid, new_c);
        assert_eq!(read(&store, &new_c).links[0].cid, rewrite(&raw));
    }

    #[test]
    fn shared_child_is_rewritten_once() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"shared");
        let child = node(&store, &[&raw]);
        let a = node(&store, &[&child]);
        let b = node(&store, &[&child, &child]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        let mut observer = RecordingObserver::default();
        let mut rewriter = DagRewriter::new(&dag, UnreadablePolicy::Skip);
        rewriter.process(&a, &mut mapping, &mut observer).unwrap();
        rewriter.process(&b, &mut mapping, &mut observer).unwrap();

        let new_child = mapping.get(&child).cloned().unwrap();
        let new_a = mapping.get(&a).cloned().unwrap();
        let new_b = mapping.get(&b).cloned().unwrap();
        assert_eq!(read(&store, &new_a).links[0].cid, new_child);
        let b_links = read(&store, &new_b).links;
        assert_eq!(b_links[0].cid, new_child);
        assert_eq!(b_links[1].cid, new_child);

        let child_rewrites = observer
            .events
            .iter()
            .filter(|e| matches!(e, Event::NodeRewritten { old, .. } if *old == child))
            .count();
        assert_eq!(child_rewrites, 1);
        assert_eq!(rewriter.stats().rewritten, 3);
    }

    #[test]
    fn child_decided_earlier_is_reused() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"x");
        let child = node(&store, &[&raw]);
        let parent = node(&store, &[&child]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        let mut rewriter = DagRewriter::new(&dag, UnreadablePolicy::Skip);
        rewriter.process(&child, &mut mapping, &mut NoopObserver).unwrap();
        rewriter.process(&parent, &mut mapping, &mut NoopObserver).unwrap();

        let new_child = mapping.get(&child).cloned().unwrap();
        let new_parent = mapping.get(&parent).cloned().unwrap();
        assert_eq!(read(&store, &new_parent).links[0].cid, new_child);
    }

    #[test]
    fn link_order_and_metadata_are_kept() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"middle");
        let before = Block::new(Codec::RAW, b"before".to_vec());
        store.put(&before).unwrap();
        let dag = BlockDagService::new(&store);
        let a = dag
            .add(&LinkedNode::new(
                vec![
                    Link::new("before", 6, before.cid().clone()),
                    Link::new("middle", 6, raw.clone()),
                ],
                b"payload".to_vec(),
            ))
            .unwrap();

        let mut mapping = MappingTable::new();
        DagRewriter::new(&dag, UnreadablePolicy::Skip)
            .process(&a, &mut mapping, &mut NoopObserver)
            .unwrap();

        let rewritten = read(&store, mapping.get(&a).unwrap());
        assert_eq!(rewritten.data, b"payload");
        assert_eq!(rewritten.links[0], Link::new("before", 6, before.cid().clone()));
        assert_eq!(rewritten.links[1], Link::new("middle", 6, rewrite(&raw)));
    }

    // -----------------------------------------------------------------------
    // Unreadable descendants and cycles
    // -----------------------------------------------------------------------

    #[test]
    fn undecodable_child_leaves_parent_unchanged() {
        let store = InMemoryBlockStore::new();
        let bad = Block::new(Codec::DAG_NODE, vec![0xde, 0xad]);
        store.put(&bad).unwrap();
        let parent = node(&store, &[bad.cid()]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        let mut observer = RecordingObserver::default();
        let mut rewriter = DagRewriter::new(&dag, UnreadablePolicy::Skip);
        rewriter.process(&parent, &mut mapping, &mut observer).unwrap();

        assert_eq!(mapping.status(&parent), Mapping::Unchanged);
        assert!(!mapping.has(bad.cid()));
        assert_eq!(
            observer.events,
            vec![Event::NodeSkipped {
                cid: bad.cid().clone()
            }]
        );
        assert_eq!(rewriter.stats().skipped, 1);
    }

    #[test]
    fn missing_child_keeps_its_edge_while_siblings_change() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"sibling");
        let missing = LinkedNode::new(vec![], b"never stored".to_vec()).cid().unwrap();
        let parent = node(&store, &[&missing, &raw]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        DagRewriter::new(&dag, UnreadablePolicy::Skip)
            .process(&parent, &mut mapping, &mut NoopObserver)
            .unwrap();

        let rewritten = read(&store, mapping.get(&parent).unwrap());
        assert_eq!(rewritten.links[0].cid, missing);
        assert_eq!(rewritten.links[1].cid, rewrite(&raw));
    }

    #[test]
    fn unreadable_root_records_nothing() {
        let store = InMemoryBlockStore::new();
        let bad = Block::new(Codec::DAG_NODE, vec![1]);
        store.put(&bad).unwrap();

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        DagRewriter::new(&dag, UnreadablePolicy::Skip)
            .process(bad.cid(), &mut mapping, &mut NoopObserver)
            .unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn abort_policy_fails_on_unreadable_child() {
        let store = InMemoryBlockStore::new();
        let bad = Block::new(Codec::DAG_NODE, vec![1, 2]);
        store.put(&bad).unwrap();
        let parent = node(&store, &[bad.cid()]);

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        let err = DagRewriter::new(&dag, UnreadablePolicy::Abort)
            .process(&parent, &mut mapping, &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, MigrateError::Unreadable { ref cid, .. } if cid == bad.cid()));
        assert!(!mapping.has(&parent));
    }

    /// A DAG service that serves a fixed cyclic graph, which a real
    /// content-addressed store cannot hold.
    struct CyclicDag {
        a: Cid,
        b: Cid,
        raw: Cid,
        added: std::cell::RefCell<Vec<LinkedNode>>,
    }

    impl DagService for CyclicDag {
        fn get(&self, cid: &Cid) -> cidfix_store::DagResult<LinkedNode> {
            let links = if *cid == self.a {
                vec![Link::new("b", 0, self.b.clone()), Link::new("raw", 0, self.raw.clone())]
            } else if *cid == self.b {
                vec![Link::new("a", 0, self.a.clone())]
            } else {
                return Err(cidfix_store::DagError::NotFound(cid.clone()));
            };
            Ok(LinkedNode::new(links, Vec::new()))
        }

        fn add(&self, node: &LinkedNode) -> cidfix_store::DagResult<Cid> {
            self.added.borrow_mut().push(node.clone());
            Ok(node.cid()?)
        }
    }

    #[test]
    fn cycles_terminate() {
        let dag = CyclicDag {
            a: LinkedNode::new(vec![], b"a".to_vec()).cid().unwrap(),
            b: LinkedNode::new(vec![], b"b".to_vec()).cid().unwrap(),
            raw: Block::new(Codec::LEGACY_RAW, b"r".to_vec()).cid().clone(),
            added: Default::default(),
        };

        let mut mapping = MappingTable::new();
        let mut rewriter = DagRewriter::new(&dag, UnreadablePolicy::Skip);
        rewriter
            .process(&dag.a.clone(), &mut mapping, &mut NoopObserver)
            .unwrap();

        assert_eq!(rewriter.stats().cycles, 1);
        assert_eq!(mapping.status(&dag.b), Mapping::Unchanged);
        assert!(mapping.get(&dag.a).is_some());
        assert_eq!(dag.added.borrow().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Depth
    // -----------------------------------------------------------------------

    #[test]
    fn deep_chain_does_not_overflow_the_stack() {
        let store = InMemoryBlockStore::new();
        let raw = legacy(&store, b"bottom");
        let mut top = node(&store, &[&raw]);
        let mut chain = vec![top.clone()];
        for _ in 0..100_000 {
            top = node(&store, &[&top]);
            chain.push(top.clone());
        }

        let dag = BlockDagService::new(&store);
        let mut mapping = MappingTable::new();
        let mut rewriter = DagRewriter::new(&dag, UnreadablePolicy::Skip);
        rewriter.process(&top, &mut mapping, &mut NoopObserver).unwrap();

        assert_eq!(rewriter.stats().rewritten, chain.len());
        assert!(chain.iter().all(|cid| mapping.get(cid).is_some()));
    }
}
