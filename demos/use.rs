use avl_ordered_map::{MapError, OrderedMap};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), MapError> {
    // RUST_LOG=trace shows every rotation.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut map = OrderedMap::new();
    map.insert(0, "zero");
    map.insert(1, "one");
    map.insert(2, "two");
    map.insert(2, "two");
    map.insert_pair((3, "three"));
    map.insert(4, "four");
    map.insert(5, "five");
    assert_eq!(map.get(&1), Some(&"one"));
    assert_eq!(map.len(), 6);
    println!("{map:?} (height {})", map.height());

    println!("3 => {}", map.value(&3)?);
    if let Err(err) = map.value(&42) {
        println!("42 => {err}");
    }

    let mut counts = OrderedMap::<&str, u32>::new();
    for word in "the quick brown fox jumps over the lazy dog the end".split_whitespace() {
        *counts.at(word) += 1;
    }
    counts.for_each_inorder(|word, count| println!("{word}: {count}"));

    counts.clear();
    assert!(counts.is_empty());
    Ok(())
}
