//! MBTI compatibility.
//!
//! One rule for every call site (scorer, explanation, search): the four letters are compared
//! position by position. Which table the product ultimately wants is still an open product
//! decision; changing it means changing only [`compatibility`].

/// Allowed letters per position.
const AXES: [[char; 2]; 4] = [['E', 'I'], ['S', 'N'], ['T', 'F'], ['J', 'P']];

/// Upper-case, validated 4-letter code. `None` for anything that is not a real type.
pub fn normalize(code: &str) -> Option<[char; 4]> {
    let upper: Vec<char> = code.trim().chars().map(|c| c.to_ascii_uppercase()).collect();
    if upper.len() != 4 {
        return None;
    }

    let mut letters = ['\0'; 4];
    for (i, letter) in upper.into_iter().enumerate() {
        if !AXES[i].contains(&letter) {
            return None;
        }
        letters[i] = letter;
    }
    Some(letters)
}

/// 4 matching positions → 1.0, 3 → 0.7, fewer but sharing E/I → 0.2, otherwise 0.
/// Missing or invalid codes score 0.
pub fn compatibility(a: Option<&str>, b: Option<&str>) -> f64 {
    let (Some(a), Some(b)) = (a.and_then(normalize), b.and_then(normalize)) else {
        return 0.0;
    };

    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    match matches {
        4 => 1.0,
        3 => 0.7,
        _ if a[0] == b[0] => 0.2,
        _ => 0.0,
    }
}

/// Best compatibility of `code` against any of `targets`.
pub fn best_compatibility<S: AsRef<str>>(code: Option<&str>, targets: &[S]) -> f64 {
    targets
        .iter()
        .map(|target| compatibility(code, Some(target.as_ref())))
        .fold(0.0, f64::max)
}
