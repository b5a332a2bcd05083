use super::*;
use std::collections::HashSet;

fn gen_string(config: &GenConfig) -> String {
    let mut out = Vec::new();
    generate(&mut out, config).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_line_count_and_length() {
    let config = GenConfig {
        lines: 25,
        strlen: 7,
        seed: Some(1),
    };
    let out = gen_string(&config);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 25);
    assert!(out.ends_with('\n'));
    for line in lines {
        assert_eq!(line.len(), 7);
        assert!(line.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }
}

#[test]
fn test_even_strlen() {
    let config = GenConfig {
        lines: 3,
        strlen: 50,
        seed: Some(2),
    };
    assert!(gen_string(&config).lines().all(|l| l.len() == 50));
}

#[test]
fn test_seed_is_reproducible() {
    let config = GenConfig {
        lines: 10,
        strlen: 16,
        seed: Some(42),
    };
    assert_eq!(gen_string(&config), gen_string(&config));

    let other = GenConfig {
        seed: Some(43),
        ..config.clone()
    };
    assert_ne!(gen_string(&config), gen_string(&other));
}

#[test]
fn test_default_shape() {
    let out = gen_string(&GenConfig::default());
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 100);
    // 25 random bytes per line: collisions are not a realistic outcome.
    assert_eq!(lines.iter().collect::<HashSet<_>>().len(), 100);
}

#[test]
fn test_zero_lines() {
    let config = GenConfig {
        lines: 0,
        ..GenConfig::default()
    };
    assert_eq!(gen_string(&config), "");
}
