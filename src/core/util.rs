//! Generic utilities used across core modules.

/// Filter items by case-insensitive query matching on two string fields.
/// Returns all items when query is empty.
pub fn filter_by_query<'a, T, F>(items: &'a [T], query: &str, get_fields: F) -> Vec<&'a T>
where
    F: Fn(&'a T) -> (&'a str, &'a str),
{
    if query.is_empty() {
        return items.iter().collect();
    }
    let q = query.to_lowercase();
    items
        .iter()
        .filter(|item| {
            let (a, b) = get_fields(item);
            a.to_lowercase().contains(&q) || b.to_lowercase().contains(&q)
        })
        .collect()
}

/// Format a token count as human-readable (e.g. "200k", "1.0M").
pub fn format_context(n: u32) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{}k", n / 1_000)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_empty_query_returns_all() {
        let items = vec!["a", "b", "c"];
        let out = filter_by_query(&items, "", |s| (s, ""));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn filter_match_second_field() {
        let items = vec![("a", "hello"), ("b", "world")];
        let out = filter_by_query(&items, "orld", |t| (t.0, t.1));
        assert_eq!(out, vec![&("b", "world")]);
    }

    #[test]
    fn filter_case_insensitive() {
        let items = vec!["Claude", "Llama"];
        let out = filter_by_query(&items, "llama", |s| (s, ""));
        assert_eq!(out, vec![&"Llama"]);
    }

    #[test]
    fn filter_no_match_returns_empty() {
        let items = vec!["hello", "world"];
        let out = filter_by_query(&items, "xyz", |s| (s, ""));
        assert!(out.is_empty());
    }

    #[test]
    fn format_context_units() {
        assert_eq!(format_context(512), "512");
        assert_eq!(format_context(200_000), "200k");
        assert_eq!(format_context(1_000_000), "1.0M");
    }
}
