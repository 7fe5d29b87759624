use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use bucket_hash::HashMap;
use bucket_hash::HashTable;
use clap::Parser;
use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KeyHashing {
    /// Per-type hashing: integer keys hash to themselves.
    Type,
    /// std's SipHash-based DefaultHasher.
    Sip,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: usize,

    /// Pre-size for this many entries instead of growing from empty.
    #[arg(short = 'c', long = "target_capacity")]
    target_capacity: Option<usize>,

    /// Multiply every key by this stride, to show how `TypeHashing` reacts to
    /// keys sharing a factor with the bucket count.
    #[arg(short = 's', long = "stride", default_value_t = 1)]
    stride: u64,

    #[arg(long = "hashing", value_enum, default_value_t = KeyHashing::Type)]
    hashing: KeyHashing,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    let keys = (0..args.entries as u64).map(|i| i.wrapping_mul(args.stride));

    match args.hashing {
        KeyHashing::Type => {
            let mut map: HashMap<u64, u64> = match args.target_capacity {
                Some(capacity) => HashMap::with_capacity(capacity),
                None => HashMap::new(),
            };
            println!("Starting bucket count: {}", map.bucket_count());

            for key in keys {
                map.insert(key, key);
            }

            println!("Inserted {} entries into map", map.len());
            println!("Final bucket count: {}", map.bucket_count());
            map.print_bucket_histogram();
            map.debug_stats().print();
        }
        KeyHashing::Sip => {
            let mut table: HashTable<u64> = match args.target_capacity {
                Some(capacity) => HashTable::with_capacity(capacity),
                None => HashTable::new(),
            };
            println!("Starting bucket count: {}", table.bucket_count());

            for key in keys {
                table.insert(hash_u64(key), key, |&v| v == key);
            }

            println!("Inserted {} entries into table", table.len());
            println!("Final bucket count: {}", table.bucket_count());
            table.print_bucket_histogram();
            table.debug_stats().print();
        }
    }
}
