use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use segdeque::Deque;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn random_deque(rng: &mut StdRng) -> Deque<u8> {
    let len = rng.gen_range(0..6);
    (0..len).map(|_| rng.gen_range(0..3)).collect()
}

#[test]
fn test_equality_requires_same_length_and_elements() {
    let a: Deque<i32> = Deque::from([1, 2, 3]);
    let b: Deque<i32> = Deque::from([1, 2, 3]);
    let shorter: Deque<i32> = Deque::from([1, 2]);
    let different: Deque<i32> = Deque::from([1, 2, 4]);

    assert_eq!(a, b);
    assert_ne!(a, shorter);
    assert_ne!(a, different);
}

#[test]
fn test_equality_ignores_storage_layout() {
    let mut front_built = Deque::new();
    for value in (0..300).rev() {
        front_built.push_front(value).unwrap();
    }
    let back_built: Deque<i32> = (0..300).collect();

    assert_eq!(front_built, back_built);
    assert_eq!(hash_of(&front_built), hash_of(&back_built));
}

#[test]
fn test_lexicographic_order() {
    let empty: Deque<i32> = Deque::new();
    let short: Deque<i32> = Deque::from([1, 2]);
    let long: Deque<i32> = Deque::from([1, 2, 0]);
    let bigger: Deque<i32> = Deque::from([1, 3]);

    assert!(empty < short);
    assert!(short < long);
    assert!(long < bigger);
    assert!(bigger > short);
    assert!(short <= short.clone());
    assert!(short >= short.clone());
    assert_eq!(short.cmp(&long), Ordering::Less);
    assert_eq!(bigger.cmp(&long), Ordering::Greater);
}

#[test]
fn test_partial_order_with_nan() {
    let a: Deque<f64> = Deque::from([1.0, f64::NAN]);
    let b: Deque<f64> = Deque::from([1.0, 2.0]);
    assert_eq!(a.partial_cmp(&b), None);
    assert_ne!(a, a.clone());
}

#[test]
fn test_comparison_laws_on_random_pairs() {
    let mut rng = StdRng::seed_from_u64(12345);
    let samples: Vec<Deque<u8>> = (0..40).map(|_| random_deque(&mut rng)).collect();

    for a in &samples {
        assert_eq!(*a, a.clone());
        assert_eq!(a.cmp(a), Ordering::Equal);

        for b in &samples {
            let as_vec_a: Vec<u8> = a.iter().copied().collect();
            let as_vec_b: Vec<u8> = b.iter().copied().collect();

            // agrees with slice ordering
            assert_eq!(a == b, as_vec_a == as_vec_b);
            assert_eq!(a.cmp(b), as_vec_a.cmp(&as_vec_b));

            // derived operators are consistent with `<`
            assert_eq!(a > b, b < a);
            assert_eq!(a <= b, !(b < a));
            assert_eq!(a >= b, !(a < b));

            // antisymmetry
            if a <= b && b <= a {
                assert_eq!(a, b);
            }
            if a == b {
                assert_eq!(hash_of(a), hash_of(b));
            }

            for c in &samples {
                if a < b && b < c {
                    assert!(a < c);
                }
                if a == b && b == c {
                    assert_eq!(a, c);
                }
            }
        }
    }
}
