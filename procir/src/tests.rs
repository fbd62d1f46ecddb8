use pretty_assertions::assert_eq;

use crate::{dominance::DominanceInfo, entity::Mode, node::CaseLabel, procedure::Procedure};

#[test]
fn resolve_follows_alias_chains() {
    let mut proc = Procedure::new("resolve");
    let entry = proc.entry();
    let a = proc.new_value(entry, Mode::Int, Some(1));
    let b = proc.new_value(entry, Mode::Int, Some(2));
    let c = proc.new_value(entry, Mode::Int, Some(3));

    proc.replace(a, b);
    proc.replace(b, c);

    assert_eq!(proc.resolve(a), c);
    assert_eq!(proc.resolve(b), c);
    assert_eq!(proc.resolve(c), c);
}

#[test]
fn kill_forwards_to_a_mode_specific_bad_node() {
    let mut proc = Procedure::new("kill");
    let entry = proc.entry();
    let a = proc.new_value(entry, Mode::Int, Some(1));

    assert!(!proc.is_bad(a));
    proc.kill(a);
    assert!(proc.is_bad(a));

    let b = proc.new_value(entry, Mode::Int, Some(2));
    proc.kill(b);
    assert_eq!(proc.resolve(a), proc.resolve(b), "both kills share one canonical Bad per mode");
}

#[test]
fn dominance_in_a_diamond() {
    let mut proc = Procedure::new("diamond");
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

    let m = proc.new_block();
    proc.set_cfgpreds(m, vec![l_exit, r_exit]);

    let dom = DominanceInfo::compute(&proc);
    assert_eq!(dom.idom(l), Some(entry));
    assert_eq!(dom.idom(r), Some(entry));
    assert_eq!(dom.idom(m), Some(entry));
    assert!(dom.dominates(entry, m));
    assert!(!dom.dominates(l, m));
    assert_eq!(dom.common_dominator(l, r), entry);
}
