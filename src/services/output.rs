use crate::domain::models::JsonOut;
use serde::Serialize;

fn print_json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&JsonOut { ok: true, data })?
    );
    Ok(())
}

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        return print_json(data);
    }
    for d in data {
        println!("{}", row(d));
    }
    Ok(())
}

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        return print_json(data);
    }
    println!("{}", row(&data));
    Ok(())
}

/// Like `print_one`, for renderers that produce several text lines.
pub fn print_report<T: Serialize>(
    json: bool,
    data: &T,
    lines: impl FnOnce(&T) -> Vec<String>,
) -> anyhow::Result<()> {
    if json {
        return print_json(data);
    }
    for line in lines(data) {
        println!("{}", line);
    }
    Ok(())
}
