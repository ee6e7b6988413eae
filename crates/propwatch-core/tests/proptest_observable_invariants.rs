//! Property-based invariant tests for observable properties and subjects.
//!
//! **ObservableProperty:**
//! 1. A subscriber sees every assignment made after it registered, in order.
//! 2. Each event's `old_value` is the previously assigned value.
//! 3. A subscriber registered late sees exactly the suffix of assignments.
//! 4. After `cancel`, the delivery counter never moves again.
//! 5. Repeated cancellation changes nothing.
//! 6. `version` equals the number of assignments.
//!
//! **Subject:**
//! 7. `advance` visits indices in cyclic order for any sequence length.
//! 8. `update_property` through N calls yields `samples[i % len]`.
//! 9. Rejected updates never touch properties or cursors.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use propwatch_core::{
    ChangeEvent, CursorStore, ObservableProperty, PropertyKind, PropertyValue, Subject, User,
    advance, update_property,
};

// ── Strategies ────────────────────────────────────────────────────────────

fn values_strategy(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(any::<i32>(), 0..=max_len)
}

fn kind_strategy() -> impl Strategy<Value = PropertyKind> {
    prop_oneof![
        Just(PropertyKind::Name),
        Just(PropertyKind::Age),
        Just(PropertyKind::InputText),
    ]
}

fn sample_strategy() -> impl Strategy<Value = PropertyValue> {
    prop_oneof![
        "[a-zA-Z]{0,8}".prop_map(PropertyValue::Text),
        (-10i64..=200).prop_map(PropertyValue::Number),
    ]
}

fn recorder(property: &ObservableProperty<i32>) -> Rc<RefCell<Vec<ChangeEvent<i32>>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let log_clone = Rc::clone(&log);
    let sub = property.observe(move |event| log_clone.borrow_mut().push(event.clone()));
    // Observation is deliberately left running for the property's lifetime.
    let _ = sub;
    log
}

// ── ObservableProperty ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn early_subscriber_sees_every_assignment(
        initial in any::<i32>(),
        values in values_strategy(64),
    ) {
        let prop = ObservableProperty::new(initial);
        let log = recorder(&prop);

        for &v in &values {
            prop.set(v);
        }

        let log = log.borrow();
        prop_assert_eq!(log.len(), values.len());
        let mut previous = initial;
        for (event, &v) in log.iter().zip(&values) {
            prop_assert_eq!(event.old_value, previous);
            prop_assert_eq!(event.new_value, v);
            previous = v;
        }
        prop_assert_eq!(prop.version(), values.len() as u64);
    }

    #[test]
    fn late_subscriber_sees_suffix(
        values in values_strategy(64),
        split in any::<proptest::sample::Index>(),
    ) {
        let prop = ObservableProperty::new(0);
        let at = split.index(values.len() + 1);

        for &v in &values[..at] {
            prop.set(v);
        }
        let log = recorder(&prop);
        for &v in &values[at..] {
            prop.set(v);
        }

        let seen: Vec<i32> = log.borrow().iter().map(|e| e.new_value).collect();
        prop_assert_eq!(seen, values[at..].to_vec());
    }

    #[test]
    fn cancel_freezes_counter(
        before in 0usize..32,
        after in 0usize..32,
        extra_cancels in 0usize..4,
    ) {
        let prop = ObservableProperty::new(0usize);
        let count = Rc::new(Cell::new(0usize));
        let count_clone = Rc::clone(&count);
        let sub = prop.observe(move |_| count_clone.set(count_clone.get() + 1));

        for i in 0..before {
            prop.set(i);
        }
        prop.cancel(&sub);
        for _ in 0..extra_cancels {
            prop.cancel(&sub);
            sub.invalidate();
        }
        for i in 0..after {
            prop.set(i);
        }

        prop_assert_eq!(count.get(), before);
        prop_assert!(!sub.is_active());
        prop_assert_eq!(prop.subscriber_count(), 0);
    }

    #[test]
    fn cancelling_one_leaves_siblings(
        subscribers in 1usize..8,
        victim in any::<proptest::sample::Index>(),
        sets in 1usize..16,
    ) {
        let prop = ObservableProperty::new(0usize);
        let counts: Vec<Rc<Cell<usize>>> =
            (0..subscribers).map(|_| Rc::new(Cell::new(0))).collect();
        let subs: Vec<_> = counts
            .iter()
            .map(|c| {
                let c = Rc::clone(c);
                prop.observe(move |_| c.set(c.get() + 1))
            })
            .collect();

        let victim = victim.index(subscribers);
        subs[victim].invalidate();
        for i in 0..sets {
            prop.set(i);
        }

        for (i, count) in counts.iter().enumerate() {
            let expected = if i == victim { 0 } else { sets };
            prop_assert_eq!(count.get(), expected);
        }
    }
}

// ── Subject ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn advance_is_cyclic(len in 1usize..20, steps in 0usize..100) {
        let sequence: Vec<usize> = (0..len).collect();
        let mut cursor = 0;
        for step in 0..steps {
            let (value, next) = advance(&sequence, cursor).expect("in bounds");
            prop_assert_eq!(value, step % len);
            cursor = next;
        }
        prop_assert_eq!(cursor, steps % len);
    }

    #[test]
    fn advance_rejects_out_of_bounds(len in 0usize..20, past in 0usize..5) {
        let sequence: Vec<usize> = (0..len).collect();
        prop_assert!(advance(&sequence, len + past).is_err());
    }

    #[test]
    fn age_updates_follow_samples(
        ages in proptest::collection::vec(0u32..150, 1..8),
        calls in 1usize..30,
    ) {
        let user = User::default();
        let mut cursors = CursorStore::new();
        let sequence: Vec<PropertyValue> = ages.iter().map(|&a| PropertyValue::from(a)).collect();

        for i in 0..calls {
            update_property(&user, PropertyKind::Age, &sequence, &mut cursors).expect("valid");
            prop_assert_eq!(user.age().get(), ages[i % ages.len()]);
        }
        prop_assert_eq!(cursors.get(PropertyKind::Age), calls % ages.len());
    }

    #[test]
    fn rejected_updates_change_nothing(
        kind in kind_strategy(),
        sequence in proptest::collection::vec(sample_strategy(), 0..6),
    ) {
        let user = User::new("Maria", 36);
        let mut cursors = CursorStore::new();

        match update_property(&user, kind, &sequence, &mut cursors) {
            Ok(_) => {
                prop_assert!(user.owns_kind(kind));
                prop_assert_eq!(user.name().version() + user.age().version(), 1);
                prop_assert_eq!(cursors.get(kind), 1 % sequence.len());
            }
            Err(err) => {
                prop_assert!(err.is_invalid_argument());
                prop_assert_eq!(user.name().get(), "Maria");
                prop_assert_eq!(user.age().get(), 36);
                prop_assert_eq!(user.name().version() + user.age().version(), 0);
                prop_assert_eq!(cursors, CursorStore::new());
            }
        }
    }
}
