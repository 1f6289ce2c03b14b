use fks_table::{PerfectHashTable, PhtError};

fn main() -> Result<(), PhtError> {
    let data = vec![
        ("best lyceum".to_string(), 239),
        ("good lyceum".to_string(), 30),
        ("good school".to_string(), 80),
    ];

    let mut table = PerfectHashTable::new(data)?;
    for key in ["best lyceum", "good lyceum", "good school", "good"] {
        match table.find(key) {
            Some(v) => println!("{key:>12}: {v}"),
            None => println!("{key:>12}: <absent>"),
        }
    }

    *table.at("good lyceum")? = 366;
    println!("{:>12}: {}", "good lyceum", table.at("good lyceum")?);

    if let Err(e) = table.at("good") {
        println!("{:>12}: {e}", "good");
    }

    let dup = PerfectHashTable::new([
        ("good school".to_string(), 80),
        ("good school".to_string(), 56),
    ]);
    if let Err(e) = dup {
        println!("duplicate input rejected: {e}");
    }

    Ok(())
}
