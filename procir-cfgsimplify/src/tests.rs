use procir::{CaseLabel, Mode, NodeKind, Procedure, Symbol};
use pretty_assertions::assert_eq;

use crate::{config::Config, driver::simplify};

/// S1: a lone chain of jump-only blocks between two real blocks collapses all the way
/// through, regardless of how many empty blocks are in the chain.
#[test]
fn lone_jump_chain_collapses_through_two_empty_blocks() {
    let mut proc = Procedure::new("s1");
    let entry = proc.entry();
    let entry_exit = proc.new_jump(entry);

    let a = proc.new_block();
    proc.set_cfgpreds(a, vec![entry_exit]);
    let a_exit = proc.new_jump(a);

    let b = proc.new_block();
    proc.set_cfgpreds(b, vec![a_exit]);
    let b_exit = proc.new_jump(b);

    let c = proc.new_block();
    proc.set_cfgpreds(c, vec![b_exit]);
    let c_exit = proc.new_jump(c);

    let out = proc.new_block();
    proc.set_entity(out, Symbol::new("out"));
    proc.set_cfgpreds(out, vec![c_exit]);

    simplify(&mut proc, &Config::new()).expect("well-formed procedure");

    assert_eq!(proc.cfgpreds(out).len(), 1);
    assert_eq!(proc.resolve(proc.cfgpreds(out)[0]), entry_exit);
}

/// S2: a diamond whose arms are both otherwise-dispensable empty blocks may only have *one*
/// arm folded away — both share the branch block as their sole predecessor, so eliding both
/// would leave the join unable to tell which path a value arrived on. The earlier arm (`l`)
/// wins the elision; the later one (`r`) is kept to anchor the join.
#[test]
fn diamond_with_join_keeps_exactly_one_arm() {
    let mut proc = Procedure::new("s2");
    let entry = proc.entry();

    let cond = proc.new_value(entry, Mode::Bool, None);
    let branch = proc.new_branch(entry, cond, true);
    let proj_true = proc.new_projection(entry, branch, CaseLabel::Value(1));
    let proj_false = proc.new_projection(entry, branch, CaseLabel::Value(0));

    let l = proc.new_block();
    proc.set_cfgpreds(l, vec![proj_true]);
    let l_exit = proc.new_jump(l);

    let r = proc.new_block();
    proc.set_cfgpreds(r, vec![proj_false]);
    let r_exit = proc.new_jump(r);

    let v1 = proc.new_value(entry, Mode::Int, Some(1));
    let v2 = proc.new_value(entry, Mode::Int, Some(2));

    let m = proc.new_block();
    proc.set_entity(m, Symbol::new("merge"));
    proc.set_cfgpreds(m, vec![l_exit, r_exit]);
    let join = proc.new_phi(m, Mode::Int, vec![v1, v2]);
    proc.push_keepalive(join);

    simplify(&mut proc, &Config::new()).expect("well-formed procedure");

    let preds = proc.cfgpreds(m);
    assert_eq!(preds.len(), 2);
    // `l` (the earlier position) is elided: its sole predecessor, `proj_true`, takes its slot.
    assert_eq!(proc.resolve(preds[0]), proj_true);
    // `r` (the later position) is kept, anchoring the join: the edge is still `r`'s own jump.
    assert_eq!(proc.resolve(preds[1]), r_exit);
    assert_eq!(proc.home_block(proc.resolve(preds[1])), Some(r));
    assert_eq!(proc.phi_operands(join), &[v1, v2]);
}

/// A switch with two live projections whose selector is known but matches neither explicit
/// case folds to the default; the non-matching case becomes a dead edge and its successor's
/// cfgpred list is pruned accordingly.
#[test]
fn switch_with_known_selector_and_no_matching_case_folds_to_default() {
    let mut proc = Procedure::new("s3");
    let entry = proc.entry();

    let selector = proc.new_value(entry, Mode::Int, Some(5));
    let branch = proc.new_branch(entry, selector, false);
    let case3 = proc.new_projection(entry, branch, CaseLabel::Value(3));
    let default = proc.new_projection(entry, branch, CaseLabel::Default);

    let a = proc.new_block();
    proc.set_entity(a, Symbol::new("case3"));
    proc.set_cfgpreds(a, vec![case3]);

    let b = proc.new_block();
    proc.set_entity(b, Symbol::new("default"));
    proc.set_cfgpreds(b, vec![default]);

    let stats = simplify(&mut proc, &Config::new()).expect("well-formed procedure");

    assert_eq!(stats.branches_folded, 1);
    assert_eq!(stats.edges_killed, 1);
    assert!(proc.is_bad(case3));
    assert!(proc.cfgpreds(a).is_empty());
    assert_eq!(proc.cfgpreds(b).len(), 1);
}

/// S3: a switch with only the default projection reachable folds to an unconditional jump
/// regardless of whether the selector's value is statically known — with one projection left,
/// it must be the one control takes, and no constant-value answer is needed to see that.
#[test]
fn switch_with_only_the_default_projection_folds_unconditionally() {
    let mut proc = Procedure::new("s3");
    let entry = proc.entry();

    let selector = proc.new_value(entry, Mode::Int, None);
    let branch = proc.new_branch(entry, selector, false);
    let default = proc.new_projection(entry, branch, CaseLabel::Default);

    let b = proc.new_block();
    proc.set_entity(b, Symbol::new("default"));
    proc.set_cfgpreds(b, vec![default]);

    let stats = simplify(&mut proc, &Config::new()).expect("well-formed procedure");

    assert_eq!(stats.branches_folded, 1);
    assert_eq!(stats.edges_killed, 0);
    assert_eq!(proc.cfgpreds(b).len(), 1);
    let edge = proc.resolve(proc.cfgpreds(b)[0]);
    assert!(matches!(proc.kind(edge), NodeKind::Jump));
}

/// S4: a switch whose selector matches one explicit case exactly folds to that case; every
/// other projection, including the default, is killed.
#[test]
fn switch_with_matching_case_folds_to_that_case() {
    let mut proc = Procedure::new("s4");
    let entry = proc.entry();

    let selector = proc.new_value(entry, Mode::Int, Some(3));
    let branch = proc.new_branch(entry, selector, false);
    let case3 = proc.new_projection(entry, branch, CaseLabel::Value(3));
    let default = proc.new_projection(entry, branch, CaseLabel::Default);

    let a = proc.new_block();
    proc.set_entity(a, Symbol::new("case3"));
    proc.set_cfgpreds(a, vec![case3]);

    let b = proc.new_block();
    proc.set_entity(b, Symbol::new("default"));
    proc.set_cfgpreds(b, vec![default]);

    let stats = simplify(&mut proc, &Config::new()).expect("well-formed procedure");

    assert_eq!(stats.branches_folded, 1);
    assert_eq!(stats.edges_killed, 1);
    assert!(proc.is_bad(default));
    assert!(proc.cfgpreds(b).is_empty());
    assert_eq!(proc.cfgpreds(a).len(), 1);
}

/// S5: a block whose sole exit jumps back to itself (a self-loop) does not send expansion
/// into an infinite recursion; the back-edge is left unexpanded.
#[test]
fn self_loop_expansion_terminates() {
    let mut proc = Procedure::new("s5");
    let entry = proc.entry();
    let entry_exit = proc.new_jump(entry);

    let h = proc.new_block();
    let h_exit = proc.new_jump(h);
    proc.set_cfgpreds(h, vec![entry_exit, h_exit]);

    let mut scratch = crate::scratch::Scratch::acquire();
    let expanded = crate::rewriter::expand_slot(&proc, &mut scratch, h_exit);

    assert_eq!(expanded.len(), 2);
    assert_eq!(proc.resolve(expanded[0]), entry_exit);
    assert_eq!(proc.resolve(expanded[1]), h_exit);
}

/// S6: a join hosted inside a block being removed relocates into the successor's own join,
/// distributing each of its operands to the position its own predecessor expanded into.
#[test]
fn join_hosted_in_a_removed_block_relocates_into_its_successor() {
    let mut proc = Procedure::new("s6");
    let entry = proc.entry();

    let cond = proc.new_value(entry, Mode::Bool, None);
    let branch = proc.new_branch(entry, cond, true);
    let proj_true = proc.new_projection(entry, branch, CaseLabel::Value(1));
    let proj_false = proc.new_projection(entry, branch, CaseLabel::Value(0));

    let v_true = proc.new_value(entry, Mode::Int, Some(10));
    let v_false = proc.new_value(entry, Mode::Int, Some(20));

    let p = proc.new_block();
    proc.set_cfgpreds(p, vec![proj_true, proj_false]);
    let p_join = proc.new_phi(p, Mode::Int, vec![v_true, v_false]);
    let p_exit = proc.new_jump(p);

    let m = proc.new_block();
    proc.set_entity(m, Symbol::new("after"));
    proc.set_cfgpreds(m, vec![p_exit]);
    let m_join = proc.new_phi(m, Mode::Int, vec![p_join]);
    proc.push_keepalive(m_join);

    simplify(&mut proc, &Config::new()).expect("well-formed procedure");

    let preds = proc.cfgpreds(m);
    assert_eq!(preds.len(), 2);
    assert_eq!(proc.resolve(preds[0]), proj_true);
    assert_eq!(proc.resolve(preds[1]), proj_false);
    assert_eq!(proc.phi_operands(m_join), &[v_true, v_false]);
}

/// The arity invariant (every join's operand count matches its home block's cfgpred count)
/// holds once the pass has reached its fixpoint, and a second run changes nothing.
#[test]
fn reaches_a_stable_fixpoint() {
    let mut proc = Procedure::new("fixpoint");
    let entry = proc.entry();
    let entry_exit = proc.new_jump(entry);

    let a = proc.new_block();
    proc.set_cfgpreds(a, vec![entry_exit]);
    let a_exit = proc.new_jump(a);

    let out = proc.new_block();
    proc.set_entity(out, Symbol::new("out"));
    proc.set_cfgpreds(out, vec![a_exit]);

    let mut config = Config::new();
    config.set_check_invariants(true);

    simplify(&mut proc, &config).expect("well-formed procedure");
    let second = simplify(&mut proc, &config).expect("well-formed procedure");

    assert_eq!(second.branches_folded, 0);
    assert_eq!(second.blocks_merged, 0);
}

/// A block with no recorded cfgpreds that isn't the entry is rejected rather than silently
/// optimized, since it means the procedure was handed to the pass before being fully wired up.
#[test]
fn rejects_an_unpinned_block() {
    let mut proc = Procedure::new("unpinned");
    let _ = proc.new_block();

    let err = simplify(&mut proc, &Config::new()).unwrap_err();
    assert!(matches!(err, crate::Error::UnpinnedBlock(_)));
}
