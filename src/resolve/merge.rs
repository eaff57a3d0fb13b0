//! Alias grouping and interactive merge
//!
//! Names are sorted by surname key so each alias group is a contiguous span;
//! grouping is a sort + scan, not a hash. Singleton groups map to themselves,
//! ambiguous groups go through the operator dialogue.

use crate::resolve::prompt::Prompt;
use crate::resolve::surname::{whole_name, LongestToken, SurnameRule};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};

/// Raw name -> canonical name, covering every raw name ever observed
pub type CanonicalMap = BTreeMap<String, String>;

struct Entry {
    raw: String,
    key: String,
}

/// Builds the canonical referee mapping from the raw name corpus
pub struct NameResolver<R: SurnameRule> {
    rule: R,
}

impl NameResolver<LongestToken> {
    pub fn new() -> Self {
        NameResolver { rule: LongestToken }
    }
}

impl Default for NameResolver<LongestToken> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SurnameRule> NameResolver<R> {
    /// Resolver with a custom surname extraction strategy
    pub fn with_rule(rule: R) -> Self {
        NameResolver { rule }
    }

    /// Merge raw name variants into canonical names
    ///
    /// Sorts by (surname key, raw name) so tie order is deterministic, scans
    /// for maximal runs sharing a key, and asks the operator about every run
    /// longer than one. Malformed answers re-prompt forever; the only way out
    /// of a question is a valid answer.
    pub fn build_canonical_mapping(
        &self,
        raw_names: &BTreeSet<String>,
        prompt: &mut dyn Prompt,
    ) -> Result<CanonicalMap> {
        let mut entries: Vec<Entry> = raw_names
            .iter()
            .map(|raw| Entry {
                raw: raw.clone(),
                key: self.rule.key(&whole_name(raw)),
            })
            .collect();
        entries.sort_by(|a, b| (&a.key, &a.raw).cmp(&(&b.key, &b.raw)));

        let mut mapping = CanonicalMap::new();
        let mut start = 0;
        while start < entries.len() {
            let mut end = start + 1;
            while end < entries.len() && entries[end].key == entries[start].key {
                end += 1;
            }
            if end - start == 1 {
                let raw = &entries[start].raw;
                mapping.insert(raw.clone(), raw.clone());
            } else {
                disambiguate(&entries[start..end], prompt, &mut mapping)?;
            }
            start = end;
        }
        Ok(mapping)
    }

    /// Deduplicated canonical roster, sorted by surname key
    pub fn roster(&self, mapping: &CanonicalMap) -> Vec<String> {
        let unique: BTreeSet<&String> = mapping.values().collect();
        let mut roster: Vec<String> = unique.into_iter().cloned().collect();
        roster.sort_by(|a, b| {
            let ka = self.rule.key(&whole_name(a));
            let kb = self.rule.key(&whole_name(b));
            ka.cmp(&kb).then_with(|| a.cmp(b))
        });
        roster
    }
}

/// Decide how many identities an ambiguous group holds and map its members
fn disambiguate(
    group: &[Entry],
    prompt: &mut dyn Prompt,
    mapping: &mut CanonicalMap,
) -> Result<()> {
    let group_size = group.len();
    prompt.say("Here is a list of possibly redundant names:");
    for (i, entry) in group.iter().enumerate() {
        prompt.say(&format!("{}) {}", i + 1, entry.raw));
    }

    let true_count = ask_count(prompt, group_size)?;
    if true_count == group_size {
        for entry in group {
            mapping.insert(entry.raw.clone(), entry.raw.clone());
        }
        return Ok(());
    }
    if true_count == 0 {
        // Operator declared nothing canonical; the group stays unmapped and
        // must be fixed by hand in the written table.
        prompt.say("No canonical names chosen; leaving this group unmapped.");
        return Ok(());
    }

    let canonical = ask_true_names(prompt, true_count, group_size)?;
    if true_count == 1 {
        // The single canonical absorbs the whole group, itself included
        let canon = group[canonical[0] - 1].raw.clone();
        for entry in group {
            mapping.insert(entry.raw.clone(), canon.clone());
        }
        return Ok(());
    }

    let owner = ask_alias_partition(prompt, group, &canonical)?;
    for (member, canon) in owner {
        mapping.insert(group[member - 1].raw.clone(), group[canon - 1].raw.clone());
    }
    Ok(())
}

fn ask_count(prompt: &mut dyn Prompt, group_size: usize) -> Result<usize> {
    loop {
        let line = prompt.ask("How many distinct names are listed above?")?;
        let value: i64 = match line.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                prompt.say("Input must be an integer.");
                continue;
            }
        };
        if value < 0 {
            prompt.say("Input cannot be negative.");
        } else if value as usize > group_size {
            prompt.say(&format!("There are only {} names listed.", group_size));
        } else {
            return Ok(value as usize);
        }
    }
}

fn ask_true_names(prompt: &mut dyn Prompt, count: usize, group_size: usize) -> Result<Vec<usize>> {
    let message = if count == 1 {
        "Enter the number corresponding to 1 correctly formatted name.".to_string()
    } else {
        format!(
            "Enter the numbers corresponding to {} correctly formatted names, separated by semicolons.",
            count
        )
    };
    loop {
        let line = prompt.ask(&message)?;
        let Some(indices) = parse_index_list(&line) else {
            prompt.say("Inputs must be integers.");
            continue;
        };
        if indices.len() != count {
            prompt.say("Wrong number of inputs.");
        } else if indices.iter().any(|&i| i < 1 || i > group_size as i64) {
            prompt.say(&format!("Inputs must lie between 1 and {}.", group_size));
        } else if has_duplicates(&indices) {
            prompt.say("Duplicate inputs.");
        } else {
            return Ok(indices.into_iter().map(|i| i as usize).collect());
        }
    }
}

/// Assign every group member to one canonical name
///
/// Each canonical index owns itself; the operator lists the aliases of each
/// canonical in turn. The lists must be pairwise disjoint and jointly cover
/// the group, otherwise all of them are asked again.
fn ask_alias_partition(
    prompt: &mut dyn Prompt,
    group: &[Entry],
    canonical: &[usize],
) -> Result<BTreeMap<usize, usize>> {
    let group_size = group.len();
    loop {
        let mut owner: BTreeMap<usize, usize> = canonical.iter().map(|&c| (c, c)).collect();
        let mut consistent = true;
        for &canon in canonical {
            let aliases = ask_aliases_of(prompt, &group[canon - 1].raw, group_size)?;
            for alias in aliases {
                if alias == canon {
                    continue;
                }
                if let Some(&prev) = owner.get(&alias) {
                    prompt.say(&format!(
                        "Name {} is already assigned to {}.",
                        alias,
                        group[prev - 1].raw
                    ));
                    consistent = false;
                } else {
                    owner.insert(alias, canon);
                }
            }
        }
        if consistent && owner.len() == group_size {
            return Ok(owner);
        }
        prompt.say("The alias lists must cover every name exactly once. Let's try again.");
    }
}

fn ask_aliases_of(
    prompt: &mut dyn Prompt,
    name: &str,
    group_size: usize,
) -> Result<BTreeSet<usize>> {
    let message = format!(
        "Please enter the numbers corresponding to aliases of {}, separated by semicolons.",
        name
    );
    loop {
        let line = prompt.ask(&message)?;
        let Some(indices) = parse_index_list(&line) else {
            prompt.say("Inputs must be integers.");
            continue;
        };
        if indices.iter().any(|&i| i < 1 || i > group_size as i64) {
            prompt.say(&format!("Inputs must be between 1 and {}.", group_size));
        } else {
            return Ok(indices.into_iter().map(|i| i as usize).collect());
        }
    }
}

fn parse_index_list(line: &str) -> Option<Vec<i64>> {
    line.split(';')
        .map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

fn has_duplicates(indices: &[i64]) -> bool {
    let unique: BTreeSet<&i64> = indices.iter().collect();
    unique.len() != indices.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::prompt::ScriptedPrompt;

    fn corpus(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn resolve(names: &[&str], replies: &[&str]) -> (CanonicalMap, ScriptedPrompt) {
        let mut prompt = ScriptedPrompt::new(replies.iter().copied());
        let mapping = NameResolver::new()
            .build_canonical_mapping(&corpus(names), &mut prompt)
            .unwrap();
        (mapping, prompt)
    }

    #[test]
    fn test_unique_surnames_map_to_themselves_without_prompting() {
        let (mapping, prompt) = resolve(&["John Smith", "Paul Durkin", "Mike Riley"], &[]);

        assert_eq!(mapping.len(), 3);
        for (alias, canonical) in &mapping {
            assert_eq!(alias, canonical);
        }
        assert!(prompt.transcript.is_empty());
    }

    #[test]
    fn test_variants_share_a_group() {
        let (_, prompt) = resolve(&["A. Wilkie", "Wilkie, A", "P Durkin"], &["2"]);

        // Only the two Wilkie variants should have been listed
        assert!(prompt.transcript.contains(&"1) A. Wilkie".to_string()));
        assert!(prompt.transcript.contains(&"2) Wilkie, A".to_string()));
        assert!(!prompt.transcript.iter().any(|line| line.contains("Durkin")));
    }

    #[test]
    fn test_single_canonical_absorbs_group() {
        // Sorted group: 1) J Smith  2) J. Smith  3) John Smith
        let (mapping, prompt) = resolve(&["J. Smith", "John Smith", "J Smith"], &["1", "3"]);

        assert_eq!(mapping.get("J. Smith").map(String::as_str), Some("John Smith"));
        assert_eq!(mapping.get("J Smith").map(String::as_str), Some("John Smith"));
        assert_eq!(mapping.get("John Smith").map(String::as_str), Some("John Smith"));
        assert_eq!(prompt.remaining(), 0);
    }

    #[test]
    fn test_no_duplication_passes_through() {
        let (mapping, _) = resolve(&["A Jones", "B Jones"], &["2"]);

        assert_eq!(mapping.get("A Jones").map(String::as_str), Some("A Jones"));
        assert_eq!(mapping.get("B Jones").map(String::as_str), Some("B Jones"));
    }

    #[test]
    fn test_multiple_canonicals_partition_group() {
        // Sorted: 1) G Willard  2) Gary Willard  3) M Willard  4) Mike Willard
        let (mapping, prompt) = resolve(
            &["Gary Willard", "G Willard", "Mike Willard", "M Willard"],
            &["2", "2;4", "1;2", "3;4"],
        );

        assert_eq!(mapping.get("G Willard").map(String::as_str), Some("Gary Willard"));
        assert_eq!(mapping.get("M Willard").map(String::as_str), Some("Mike Willard"));
        assert_eq!(mapping.get("Gary Willard").map(String::as_str), Some("Gary Willard"));
        assert_eq!(mapping.get("Mike Willard").map(String::as_str), Some("Mike Willard"));
        assert_eq!(prompt.remaining(), 0);
    }

    #[test]
    fn test_overlapping_alias_lists_are_asked_again() {
        // First round claims name 1 for both canonicals; second round is clean
        let (mapping, prompt) = resolve(
            &["Gary Willard", "G Willard", "Mike Willard", "M Willard"],
            &["2", "2;4", "1;2", "1;4", "1;2", "3;4"],
        );

        assert_eq!(mapping.get("M Willard").map(String::as_str), Some("Mike Willard"));
        assert_eq!(prompt.remaining(), 0);
    }

    #[test]
    fn test_uncovered_members_are_asked_again() {
        // First round leaves names 1 and 3 unassigned
        let (mapping, prompt) = resolve(
            &["Gary Willard", "G Willard", "Mike Willard", "M Willard"],
            &["2", "2;4", "2", "4", "1;2", "3;4"],
        );

        assert_eq!(mapping.get("G Willard").map(String::as_str), Some("Gary Willard"));
        assert_eq!(prompt.remaining(), 0);
    }

    #[test]
    fn test_bad_count_input_reprompts() {
        // Too large, non-integer, negative, then valid
        let (mapping, prompt) = resolve(&["A Jones", "B Jones"], &["7", "abc", "-1", "2"]);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("A Jones").map(String::as_str), Some("A Jones"));
        assert!(prompt.transcript.contains(&"There are only 2 names listed.".to_string()));
        assert!(prompt.transcript.contains(&"Input must be an integer.".to_string()));
        assert!(prompt.transcript.contains(&"Input cannot be negative.".to_string()));
    }

    #[test]
    fn test_bad_true_name_input_reprompts() {
        // Wrong cardinality, out of range, then valid
        let (mapping, prompt) = resolve(&["A Jones", "B Jones"], &["1", "1;2", "0", "2"]);

        assert_eq!(mapping.get("A Jones").map(String::as_str), Some("B Jones"));
        assert_eq!(mapping.get("B Jones").map(String::as_str), Some("B Jones"));
        assert!(prompt.transcript.contains(&"Wrong number of inputs.".to_string()));
        assert!(prompt.transcript.contains(&"Inputs must lie between 1 and 2.".to_string()));
    }

    #[test]
    fn test_zero_true_names_leaves_group_unmapped() {
        let (mapping, _) = resolve(&["A Jones", "B Jones", "Paul Durkin"], &["0"]);

        assert!(!mapping.contains_key("A Jones"));
        assert!(!mapping.contains_key("B Jones"));
        assert_eq!(mapping.get("Paul Durkin").map(String::as_str), Some("Paul Durkin"));
    }

    #[test]
    fn test_script_exhaustion_is_an_error() {
        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let result =
            NameResolver::new().build_canonical_mapping(&corpus(&["A Jones", "B Jones"]), &mut prompt);
        assert!(result.is_err());
    }

    #[test]
    fn test_roster_sorted_by_surname() {
        let mut mapping = CanonicalMap::new();
        mapping.insert("A. Wilkie".to_string(), "Alan Wilkie".to_string());
        mapping.insert("Wilkie, A".to_string(), "Alan Wilkie".to_string());
        mapping.insert("P Durkin".to_string(), "P Durkin".to_string());

        let roster = NameResolver::new().roster(&mapping);
        assert_eq!(roster, vec!["P Durkin".to_string(), "Alan Wilkie".to_string()]);
    }

    #[test]
    fn test_surname_rule_is_pluggable() {
        struct FirstToken;
        impl SurnameRule for FirstToken {
            fn key(&self, whole: &str) -> String {
                whole.split_whitespace().next().unwrap_or("").to_string()
            }
        }

        // Under FirstToken, "A. Wilkie" and "A Jones" share key "A"
        let resolver = NameResolver::with_rule(FirstToken);
        let mut prompt = ScriptedPrompt::new(["2"]);
        let mapping = resolver
            .build_canonical_mapping(&corpus(&["A. Wilkie", "A Jones"]), &mut prompt)
            .unwrap();

        assert_eq!(mapping.len(), 2);
        assert_eq!(prompt.remaining(), 0);
    }
}
