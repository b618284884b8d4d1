use strata::tree::Strata;

fn main() {
    let key = 42;
    let value = "something".to_string();

    // Create a tree with a capacity of 7 keys per node
    let mut tree = Strata::try_new(7).expect("7 is a valid capacity");

    // Make sure we can't find our key in the tree
    assert!(!tree.contains(key));
    assert_eq!(tree.get(key), None);

    // Insert our key and value
    tree.insert(key, value.clone());

    // Make sure we can find it again
    assert!(tree.contains(key));
    assert_eq!(tree.get(key), Some(&value));

    // Updating the value in place doesn't add an entry
    tree.insert(key, "something else".to_string());
    assert_eq!(tree.count(), 1);

    println!("{}", tree.to_ascii());
}
