//! Unit tests for products of tensor expressions
//!
//! Each case runs once with `f64` components and once with `DataVector`
//! components. Operands are filled with consecutive integers so expected
//! values can be compared exactly.


use generators::{POINTS, field, iota, spacetime, spatial, structure};
use tensorex::indices as ti;
use tensorex::{
    Component, DataVector, Frame, SlotSpec, Symmetry, Tensor, TensorStructure, Valence, evaluate,
    evaluate_into,
};

use Valence::{Lo, Up};

fn sum<T: Component>(terms: impl IntoIterator<Item = T>) -> T {
    let mut terms = terms.into_iter();
    let mut acc = terms.next().expect("at least one term");
    for term in terms {
        acc.accumulate(&term);
    }
    acc
}

fn mul<T: Component>(x: &T, y: &T) -> T {
    x.product_with(y)
}

// ============================================================================
// Outer products
// ============================================================================

fn check_outer_product_with_literals<T: Component>(make: impl Fn(f64) -> T) {
    let s = iota(structure(&[2, 1], vec![spatial(Lo), spatial(Lo)]), 1.0, &make);

    let scaled = evaluate(&[ti::i, ti::j], &(5.6 * s.ix(&[ti::i, ti::j]))).unwrap();
    let right = evaluate(&[ti::i, ti::j], &(s.ix(&[ti::i, ti::j]) * -8.1)).unwrap();
    let both = evaluate(&[ti::i, ti::j], &(-1.7 * s.ix(&[ti::i, ti::j]) * 0.6)).unwrap();

    for i in 0..3 {
        for j in 0..3 {
            let sij = s.get(&[i, j]);
            let lit = |v: f64| T::splat_like(v, sij);
            assert_eq!(scaled.get(&[i, j]), &mul(&lit(5.6), sij));
            assert_eq!(right.get(&[i, j]), &mul(sij, &lit(-8.1)));
            assert_eq!(both.get(&[i, j]), &mul(&mul(&lit(-1.7), sij), &lit(0.6)));
        }
    }
}

#[test]
fn test_outer_product_with_literals() {
    check_outer_product_with_literals(|x| x);
    check_outer_product_with_literals(field);
}

fn check_outer_product_rank_0_operand<T: Component>(make: impl Fn(f64) -> T) {
    let r = Tensor::scalar(make(5.6));
    let s = iota(structure(&[2, 1], vec![spatial(Lo), spatial(Lo)]), 1.0, &make);
    let tll = iota(structure(&[2, 1], vec![spacetime(Lo), spatial(Lo)]), 1.0, &make);

    let l_ij = evaluate(&[ti::i, ti::j], &(r.ix(&[]) * s.ix(&[ti::i, ti::j]))).unwrap();
    let l_ji = evaluate(&[ti::j, ti::i], &(s.ix(&[ti::i, ti::j]) * r.ix(&[]))).unwrap();
    for i in 0..3 {
        for j in 0..3 {
            let expected = mul(r.get(&[]), s.get(&[i, j]));
            assert_eq!(l_ij.get(&[i, j]), &expected);
            assert_eq!(l_ji.get(&[j, i]), &mul(s.get(&[i, j]), r.get(&[])));
        }
    }

    let l_ai = evaluate(&[ti::a, ti::i], &(r.ix(&[]) * tll.ix(&[ti::a, ti::i]))).unwrap();
    let l_ia = evaluate(&[ti::i, ti::a], &(tll.ix(&[ti::a, ti::i]) * r.ix(&[]))).unwrap();
    assert_eq!(l_ai.structure(), tll.structure());
    assert_eq!(l_ia.structure().slots(), &[spatial(Lo), spacetime(Lo)]);
    for a in 0..4 {
        for i in 0..3 {
            assert_eq!(l_ai.get(&[a, i]), &mul(r.get(&[]), tll.get(&[a, i])));
            assert_eq!(l_ia.get(&[i, a]), &mul(tll.get(&[a, i]), r.get(&[])));
        }
    }
}

#[test]
fn test_outer_product_rank_0_operand() {
    check_outer_product_rank_0_operand(|x| x);
    check_outer_product_rank_0_operand(field);
}

fn check_outer_product_rank_1_operands<T: Component>(make: impl Fn(f64) -> T) {
    let rl = iota(TensorStructure::asymmetric(vec![spatial(Lo)]), 1.0, &make);
    let su = iota(TensorStructure::asymmetric(vec![spacetime(Up)]), 4.0, &make);
    let tu = iota(TensorStructure::asymmetric(vec![spatial(Up)]), -3.0, &make);

    let l_ai = evaluate(&[ti::A, ti::i], &(rl.ix(&[ti::i]) * su.ix(&[ti::A]))).unwrap();
    let l_jai = evaluate(
        &[ti::J, ti::A, ti::i],
        &(rl.ix(&[ti::i]) * su.ix(&[ti::A]) * tu.ix(&[ti::J])),
    )
    .unwrap();

    for a in 0..4 {
        for i in 0..3 {
            assert_eq!(l_ai.get(&[a, i]), &mul(rl.get(&[i]), su.get(&[a])));
            for j in 0..3 {
                let expected = mul(&mul(rl.get(&[i]), su.get(&[a])), tu.get(&[j]));
                assert_eq!(l_jai.get(&[j, a, i]), &expected);
            }
        }
    }
}

#[test]
fn test_outer_product_rank_1_operands() {
    check_outer_product_rank_1_operands(|x| x);
    check_outer_product_rank_1_operands(field);
}

fn check_outer_product_rank_2x2_operands<T: Component>(make: impl Fn(f64) -> T) {
    let rll = iota(structure(&[2, 1], vec![spacetime(Lo), spacetime(Lo)]), 1.0, &make);
    let sul = iota(structure(&[2, 1], vec![spatial(Up), spacetime(Lo)]), 2.0, &make);
    let expr = rll.ix(&[ti::a, ti::b]) * sul.ix(&[ti::I, ti::c]);

    // Every ordering of the four free indices
    let tokens = [ti::a, ti::b, ti::I, ti::c];
    let orders: [[usize; 4]; 6] = [
        [0, 1, 2, 3],
        [3, 2, 1, 0],
        [2, 0, 3, 1],
        [1, 3, 0, 2],
        [0, 2, 1, 3],
        [3, 0, 2, 1],
    ];
    for order in orders {
        let output: Vec<_> = order.iter().map(|&p| tokens[p]).collect();
        let l = evaluate(&output, &expr).unwrap();
        for a in 0..4 {
            for b in 0..4 {
                for i in 0..3 {
                    for c in 0..4 {
                        let values = [a, b, i, c];
                        let index: Vec<usize> = order.iter().map(|&p| values[p]).collect();
                        let expected = mul(rll.get(&[a, b]), sul.get(&[i, c]));
                        assert_eq!(l.get(&index), &expected);
                    }
                }
            }
        }
    }
}

#[test]
fn test_outer_product_rank_2x2_operands() {
    check_outer_product_rank_2x2_operands(|x| x);
    check_outer_product_rank_2x2_operands(field);
}

#[test]
fn test_outer_product_keeps_operand_symmetry() {
    let g = iota(structure(&[1, 1], vec![spacetime(Lo), spacetime(Lo)]), 1.0, |x| x);
    let v = iota(TensorStructure::asymmetric(vec![spatial(Up)]), 1.0, |x| x);

    let l = evaluate(&[ti::b, ti::I, ti::a], &(g.ix(&[ti::a, ti::b]) * v.ix(&[ti::I]))).unwrap();
    assert_eq!(l.structure().symmetry(), &Symmetry::new(&[1, 2, 1]));
    assert_eq!(l.len(), 10 * 3);

    // Same tensor twice: separate operands are not symmetric with each other
    let w = iota(TensorStructure::asymmetric(vec![spacetime(Lo)]), 1.0, |x| x);
    let ww = evaluate(&[ti::a, ti::b], &(w.ix(&[ti::a]) * w.ix(&[ti::b]))).unwrap();
    assert_eq!(ww.structure().symmetry(), &Symmetry::asymmetric(2));
}

// ============================================================================
// Inner products
// ============================================================================

fn check_inner_product_rank_1x1<T: Component>(make: impl Fn(f64) -> T) {
    let ru = iota(TensorStructure::asymmetric(vec![spacetime(Up)]), 1.0, &make);
    let sl = iota(TensorStructure::asymmetric(vec![spacetime(Lo)]), 5.0, &make);

    let rs = evaluate(&[], &(ru.ix(&[ti::A]) * sl.ix(&[ti::a]))).unwrap();
    let sr = evaluate(&[], &(sl.ix(&[ti::a]) * ru.ix(&[ti::A]))).unwrap();

    let expected = sum((0..4).map(|a| mul(ru.get(&[a]), sl.get(&[a]))));
    assert_eq!(rs.get(&[]), &expected);
    assert_eq!(sr.get(&[]), &expected);
}

#[test]
fn test_inner_product_rank_1x1() {
    check_inner_product_rank_1x1(|x| x);
    check_inner_product_rank_1x1(field);
}

fn check_inner_product_rank_2x2<T: Component>(make: impl Fn(f64) -> T) {
    let st_lo = SlotSpec::spacetime(3, Lo, Frame::Inertial);
    let st_up = SlotSpec::spacetime(3, Up, Frame::Inertial);
    let sp_lo = SlotSpec::spatial(2, Lo, Frame::Inertial);
    let sp_up = SlotSpec::spatial(2, Up, Frame::Inertial);

    let rll = iota(TensorStructure::asymmetric(vec![st_lo, sp_lo]), 1.0, &make);
    let ruu = iota(TensorStructure::asymmetric(vec![st_up, sp_up]), 3.0, &make);
    let suu = iota(TensorStructure::asymmetric(vec![sp_up, st_up]), -2.0, &make);

    let l_direct = evaluate(&[], &(rll.ix(&[ti::a, ti::i]) * ruu.ix(&[ti::A, ti::I]))).unwrap();
    let l_swapped = evaluate(&[], &(rll.ix(&[ti::a, ti::i]) * suu.ix(&[ti::I, ti::A]))).unwrap();

    let mut direct = Vec::new();
    let mut swapped = Vec::new();
    for a in 0..4 {
        for i in 0..2 {
            direct.push(mul(rll.get(&[a, i]), ruu.get(&[a, i])));
            swapped.push(mul(rll.get(&[a, i]), suu.get(&[i, a])));
        }
    }
    assert_eq!(l_direct.get(&[]), &sum(direct));
    assert_eq!(l_swapped.get(&[]), &sum(swapped));
}

#[test]
fn test_inner_product_rank_2x2() {
    check_inner_product_rank_2x2(|x| x);
    check_inner_product_rank_2x2(field);
}

fn check_three_term_inner_outer_product<T: Component>(make: impl Fn(f64) -> T) {
    let sp_up = SlotSpec::spatial(3, Up, Frame::Inertial);
    let sp_lo = SlotSpec::spatial(3, Lo, Frame::Inertial);
    let ru = iota(TensorStructure::asymmetric(vec![sp_up]), 1.0, &make);
    let sl = iota(TensorStructure::asymmetric(vec![sp_lo]), 4.0, &make);
    let tl = iota(TensorStructure::asymmetric(vec![sp_lo]), 7.0, &make);
    let guu = iota(TensorStructure::asymmetric(vec![sp_up, sp_up]), 1.0, &make);

    let jji = evaluate(&[ti::i], &(ru.ix(&[ti::J]) * sl.ix(&[ti::j]) * tl.ix(&[ti::i]))).unwrap();
    let jij = evaluate(&[ti::i], &(ru.ix(&[ti::J]) * tl.ix(&[ti::i]) * sl.ix(&[ti::j]))).unwrap();
    let ijj = evaluate(&[ti::i], &(tl.ix(&[ti::i]) * sl.ix(&[ti::j]) * ru.ix(&[ti::J]))).unwrap();
    assert_eq!(jji.structure(), tl.structure());

    for i in 0..3 {
        let expected = sum((0..3).map(|j| mul(&mul(ru.get(&[j]), sl.get(&[j])), tl.get(&[i]))));
        assert_eq!(jji.get(&[i]), &expected);
        assert_eq!(jij.get(&[i]), &expected);
        assert_eq!(ijj.get(&[i]), &expected);
    }

    let l_ik = evaluate(
        &[ti::i, ti::K],
        &(sl.ix(&[ti::j]) * tl.ix(&[ti::i]) * guu.ix(&[ti::J, ti::K])),
    )
    .unwrap();
    assert_eq!(l_ik.structure().slots(), &[sp_lo, sp_up]);
    for i in 0..3 {
        for k in 0..3 {
            let expected =
                sum((0..3).map(|j| mul(&mul(sl.get(&[j]), tl.get(&[i])), guu.get(&[j, k]))));
            assert_eq!(l_ik.get(&[i, k]), &expected);
        }
    }
}

#[test]
fn test_three_term_inner_outer_product() {
    check_three_term_inner_outer_product(|x| x);
    check_three_term_inner_outer_product(field);
}

#[test]
fn test_trace_within_one_operand() {
    let mixed = TensorStructure::asymmetric(vec![spacetime(Up), spacetime(Lo)]);
    let m = iota(mixed, 1.0, |x| x);
    let trace = evaluate(&[], &m.ix(&[ti::A, ti::a])).unwrap();
    let expected: f64 = (0..4).map(|a| *m.get(&[a, a])).sum();
    assert_eq!(*trace.get(&[]), expected);
}

// ============================================================================
// Spatial labels on spacetime slots
// ============================================================================

fn check_spatial_spacetime_index<T: Component>(make: impl Fn(f64) -> T) {
    let r = iota(TensorStructure::asymmetric(vec![spacetime(Up)]), 1.0, &make);
    let s = iota(TensorStructure::asymmetric(vec![spatial(Lo)]), 5.0, &make);
    let t = iota(TensorStructure::asymmetric(vec![spacetime(Lo)]), 9.0, &make);

    let rs = evaluate(&[], &(r.ix(&[ti::I]) * s.ix(&[ti::i]))).unwrap();
    let rt = evaluate(&[], &(r.ix(&[ti::K]) * t.ix(&[ti::k]))).unwrap();
    assert_eq!(rs.get(&[]), &sum((0..3).map(|i| mul(r.get(&[i + 1]), s.get(&[i])))));
    assert_eq!(rt.get(&[]), &sum((0..3).map(|i| mul(r.get(&[i + 1]), t.get(&[i + 1])))));

    let st_lo = SlotSpec::spacetime(3, Lo, Frame::Inertial);
    let st_up = SlotSpec::spacetime(3, Up, Frame::Inertial);
    let sp_lo = SlotSpec::spatial(3, Lo, Frame::Inertial);
    let g = iota(structure(&[1, 1], vec![st_lo, st_lo]), 1.0, &make);
    let h = iota(structure(&[2, 1], vec![sp_lo, st_up]), 2.0, &make);

    let gh = evaluate(
        &[ti::j, ti::a, ti::i, ti::B],
        &(g.ix(&[ti::i, ti::a]) * h.ix(&[ti::j, ti::B])),
    )
    .unwrap();
    assert_eq!(gh.structure().slots(), &[sp_lo, st_lo, sp_lo, st_up]);
    assert_eq!(gh.structure().symmetry(), &Symmetry::asymmetric(4));
    for j in 0..3 {
        for a in 0..4 {
            for i in 0..3 {
                for b in 0..4 {
                    let expected = mul(g.get(&[i + 1, a]), h.get(&[j, b]));
                    assert_eq!(gh.get(&[j, a, i, b]), &expected);
                }
            }
        }
    }

    let hg = evaluate(&[ti::k, ti::i], &(h.ix(&[ti::i, ti::J]) * g.ix(&[ti::k, ti::j]))).unwrap();
    assert_eq!(hg.structure().slots(), &[sp_lo, sp_lo]);
    for k in 0..3 {
        for i in 0..3 {
            let expected = sum((0..3).map(|j| mul(h.get(&[i, j + 1]), g.get(&[k + 1, j + 1]))));
            assert_eq!(hg.get(&[k, i]), &expected);
        }
    }
}

#[test]
fn test_spatial_spacetime_index() {
    check_spatial_spacetime_index(|x| x);
    check_spatial_spacetime_index(field);
}

// ============================================================================
// Time index
// ============================================================================

fn check_time_index<T: Component>(make: impl Fn(f64) -> T, placeholder: T) {
    let r = iota(TensorStructure::asymmetric(vec![spacetime(Lo)]), 1.0, &make);
    let s = Tensor::scalar(make(-2.0));

    let l = evaluate(&[], &(r.ix(&[ti::t]) * s.ix(&[]) * r.ix(&[ti::t]))).unwrap();
    assert_eq!(l.get(&[]), &mul(&mul(r.get(&[0]), s.get(&[])), r.get(&[0])));

    let g = iota(structure(&[2, 1], vec![spacetime(Lo), spacetime(Up)]), 1.0, &make);
    let h = iota(
        structure(&[3, 2, 1], vec![spacetime(Lo), spacetime(Up), spacetime(Up)]),
        2.0,
        &make,
    );

    let l_b = evaluate(&[ti::B], &(g.ix(&[ti::t, ti::A]) * h.ix(&[ti::a, ti::T, ti::B]))).unwrap();
    assert_eq!(l_b.structure().slots(), &[spacetime(Up)]);
    for b in 0..4 {
        let expected = sum((0..4).map(|a| mul(g.get(&[0, a]), h.get(&[a, 0, b]))));
        assert_eq!(l_b.get(&[b]), &expected);
    }

    // Only the time slice is written; the rest keeps the placeholder
    let target = structure(&[2, 1, 1], vec![spacetime(Up), spacetime(Lo), spacetime(Lo)]);
    let mut l_tba = Tensor::new(target, placeholder.clone());
    evaluate_into(&mut l_tba, &[ti::T, ti::b, ti::a], &(r.ix(&[ti::a]) * r.ix(&[ti::b]))).unwrap();
    for b in 0..4 {
        for a in 0..4 {
            assert_eq!(l_tba.get(&[0, b, a]), &mul(r.get(&[a]), r.get(&[b])));
            for i in 0..3 {
                assert_eq!(l_tba.get(&[i + 1, b, a]), &placeholder);
            }
        }
    }

    let target = TensorStructure::asymmetric(vec![spacetime(Up), spacetime(Up)]);
    let mut l_ct = Tensor::new(target, placeholder.clone());
    evaluate_into(
        &mut l_ct,
        &[ti::C, ti::T],
        &(g.ix(&[ti::t, ti::B]) * h.ix(&[ti::b, ti::A, ti::C]) * g.ix(&[ti::a, ti::T])),
    )
    .unwrap();
    for c in 0..4 {
        let mut terms = Vec::new();
        for b in 0..4 {
            for a in 0..4 {
                terms.push(mul(&mul(g.get(&[0, b]), h.get(&[b, a, c])), g.get(&[a, 0])));
            }
        }
        assert_eq!(l_ct.get(&[c, 0]), &sum(terms));
        for i in 0..3 {
            assert_eq!(l_ct.get(&[c, i + 1]), &placeholder);
        }
    }
}

#[test]
fn test_time_index() {
    check_time_index(|x| x, f64::MAX);
    check_time_index(field, DataVector::new(POINTS, f64::MAX));
}

#[test]
fn test_spatial_label_on_target_writes_spatial_slice() {
    let v = iota(TensorStructure::asymmetric(vec![spatial(Lo)]), 1.0, |x| x);
    let mut target = Tensor::new(TensorStructure::asymmetric(vec![spacetime(Lo)]), -1.0);
    evaluate_into(&mut target, &[ti::i], &(2.0 * v.ix(&[ti::i]))).unwrap();
    assert_eq!(*target.get(&[0]), -1.0);
    for i in 0..3 {
        assert_eq!(*target.get(&[i + 1]), 2.0 * v.get(&[i]));
    }
}
