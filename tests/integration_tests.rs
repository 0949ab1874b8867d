use segdeque::{Deque, BLOCK_SIZE, INITIAL_MAP_CAPACITY};

fn contents<T: Clone>(deque: &Deque<T>) -> Vec<T> {
    deque.iter().cloned().collect()
}

#[test]
fn test_deque_initialization() {
    let deque: Deque<i32> = Deque::new();

    assert_eq!(deque.len(), 0);
    assert!(deque.is_empty());
    assert_eq!(deque.map_capacity(), INITIAL_MAP_CAPACITY);
    assert_eq!(deque.allocated_blocks(), 1);
}

#[test]
fn test_default_matches_new() {
    let deque: Deque<String> = Deque::default();
    assert!(deque.is_empty());
    assert_eq!(deque.map_capacity(), INITIAL_MAP_CAPACITY);
}

#[test]
fn test_end_operations_scenario() {
    let mut deque = Deque::new();

    deque.push_back(1).unwrap();
    deque.push_back(2).unwrap();
    deque.push_front(0).unwrap();

    assert_eq!(deque.len(), 3);
    assert_eq!(deque.front(), Ok(&0));
    assert_eq!(deque.back(), Ok(&2));
    assert_eq!(contents(&deque), vec![0, 1, 2]);

    deque.pop_front().unwrap();
    assert_eq!(deque.front(), Ok(&1));

    deque.pop_back().unwrap();
    assert_eq!(deque.back(), Ok(&1));
    assert_eq!(deque.len(), 1);

    deque.clear();
    assert!(deque.is_empty());
}

#[test]
fn test_assign_insert_erase_scenario() {
    let mut deque = Deque::new();

    deque.assign(5, 7).unwrap();
    assert_eq!(deque.len(), 5);
    assert!(deque.iter().all(|&value| value == 7));

    let position = deque.begin().index() + 2;
    assert_eq!(deque.insert(position, 42), Ok(2));
    assert_eq!(deque.len(), 6);
    assert_eq!(deque[2], 42);

    assert_eq!(deque.erase(position), Ok(2));
    assert_eq!(deque.len(), 5);
    assert_eq!(deque[2], 7);
}

#[test]
fn test_indexing_across_blocks() {
    let count = BLOCK_SIZE * 5 + 3;
    let mut deque = Deque::new();
    for value in 0..count {
        deque.push_back(value).unwrap();
    }

    for index in 0..count {
        assert_eq!(deque[index], index);
        assert_eq!(deque.get(index), Some(&index));
        assert_eq!(deque.at(index), Ok(&index));
    }
    assert!(deque.get(count).is_none());
}

#[test]
fn test_index_mut_and_get_mut() {
    let mut deque: Deque<i32> = (0..10).collect();

    deque[3] = 30;
    *deque.get_mut(4).unwrap() = 40;
    *deque.at_mut(5).unwrap() = 50;
    *deque.front_mut().unwrap() = -1;
    *deque.back_mut().unwrap() = 90;

    assert_eq!(contents(&deque), vec![-1, 1, 2, 30, 40, 50, 6, 7, 8, 90]);
}

#[test]
#[should_panic(expected = "Index 3 out of bounds for deque of length 3")]
fn test_index_panics_out_of_bounds() {
    let deque: Deque<i32> = Deque::from([1, 2, 3]);
    let _value = deque[3];
}

#[test]
#[should_panic(expected = "Index 0 out of bounds for deque of length 0")]
fn test_index_mut_panics_on_empty() {
    let mut deque: Deque<i32> = Deque::new();
    deque[0] = 1;
}

#[test]
fn test_elements_are_not_moved_by_end_growth() {
    let mut deque = Deque::new();
    deque.push_back(0u64).unwrap();
    let address: *const u64 = deque.front().unwrap();

    for value in 1..(BLOCK_SIZE as u64 * 40) {
        deque.push_back(value).unwrap();
        deque.push_front(value).unwrap();
    }

    let index = BLOCK_SIZE * 40 - 1;
    assert_eq!(deque[index], 0);
    assert!(core::ptr::eq(&deque[index], address));
}

#[test]
fn test_owned_values_are_dropped() {
    let mut deque = Deque::new();
    for index in 0..500 {
        deque.push_back(format!("value_{index}")).unwrap();
    }
    for _ in 0..100 {
        deque.pop_front().unwrap();
    }
    assert_eq!(deque.front().unwrap(), "value_100");
    assert_eq!(deque.back().unwrap(), "value_499");
    drop(deque);
}

#[test]
fn test_with_map_capacity() {
    let mut deque = Deque::with_map_capacity(2).unwrap();
    assert_eq!(deque.map_capacity(), 2);

    for value in 0..1000 {
        deque.push_front(value).unwrap();
    }
    assert!(deque.map_capacity() > 2);

    deque.clear();
    assert_eq!(deque.map_capacity(), 2);
    assert_eq!(deque.allocated_blocks(), 1);
}

#[test]
fn test_from_conversions() {
    let from_vec: Deque<i32> = Deque::from(vec![1, 2, 3]);
    let from_array: Deque<i32> = Deque::from([1, 2, 3]);
    let collected: Deque<i32> = (1..=3).collect();

    assert_eq!(from_vec, from_array);
    assert_eq!(from_vec, collected);
}

#[test]
fn test_extend_by_value_and_by_reference() {
    let mut deque: Deque<i32> = Deque::new();
    deque.extend(vec![1, 2]);
    deque.extend(&[3, 4]);
    deque.try_extend(5..=6).unwrap();

    assert_eq!(contents(&deque), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_debug_format() {
    let deque: Deque<i32> = Deque::from([1, 2, 3]);
    assert_eq!(format!("{deque:?}"), "[1, 2, 3]");

    let empty: Deque<i32> = Deque::new();
    assert_eq!(format!("{empty:?}"), "[]");
}

#[test]
fn test_clone_is_deep() {
    let mut original: Deque<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let copy = original.clone();

    original[0].push('!');
    original.push_back("d".to_string()).unwrap();

    assert_eq!(copy.len(), 3);
    assert_eq!(copy[0], "a");
    assert_eq!(original[0], "a!");
}

#[test]
fn test_clone_from_and_assign_from() {
    let source: Deque<i32> = (0..300).collect();

    let mut target: Deque<i32> = (0..5).collect();
    target.clone_from(&source);
    assert_eq!(target, source);

    let mut other: Deque<i32> = Deque::new();
    other.assign_from(&source).unwrap();
    assert_eq!(other, source);
}

#[test]
fn test_swap_contents() {
    let mut left: Deque<i32> = (0..100).collect();
    let mut right: Deque<i32> = Deque::from([7]);

    left.swap(&mut right);

    assert_eq!(contents(&left), vec![7]);
    assert_eq!(contents(&right), (0..100).collect::<Vec<_>>());
}

#[test]
fn test_deque_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Deque<i32>>();
    assert_send_sync::<Deque<String>>();
}
