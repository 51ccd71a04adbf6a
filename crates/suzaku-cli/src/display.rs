// Copyright 2025 The Suzaku CLI Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Table output for list commands.

use std::fmt::Display;

use tabled::{builder::Builder, settings::Style};

/// Render `rows` under `headers` as a table.
pub fn table<R, C>(headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<C>>,
    C: Display,
{
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|header| header.to_string()));
    for row in rows {
        builder.push_record(row.iter().map(ToString::to_string));
    }
    builder.build().with(Style::modern()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_and_rows() {
        let rendered =
            table(&["L1", "Metadata"], vec![vec!["0x01", "https://a"], vec!["0x02", "https://b"]]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with('┌'));
        assert!(lines[1].contains("L1") && lines[1].contains("Metadata"));
        assert!(rendered.contains("https://b"));
        assert_eq!(lines.len(), 7);
    }
}
