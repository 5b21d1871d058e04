use std::path::{Path, PathBuf};

pub const HEADER: &str = "sqft,bedrooms,property_type_Bunglow,price";

/// Price is an exact linear function of the features.
pub fn linear_rows(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let sqft = 650 + i * 40;
            let bedrooms = 1 + i % 4;
            let bunglow = i % 4 == 0;
            let price = 110 * sqft + 18_000 * bedrooms + if bunglow { 55_000 } else { 0 } + 30_000;
            let flag = if bunglow { "True" } else { "False" };
            format!("{sqft},{bedrooms},{flag},{price}")
        })
        .collect()
}

pub fn write_csv(dir: &Path, name: &str, header: &str, rows: &[String]) -> PathBuf {
    let mut text = String::from(header);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write csv");
    path
}

pub fn write_linear_dataset(dir: &Path, count: usize) -> PathBuf {
    write_csv(dir, "final.csv", HEADER, &linear_rows(count))
}
