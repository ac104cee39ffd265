#![allow(dead_code)]

use chrono::{Datelike, Utc};
use serde_json::{json, Value};

const FIRST_NAMES: [&str; 5] = ["Ada", "Grace", "Alan", "Edsger", "Barbara"];

/// Letters-only suffix so generated names stay valid.
fn letters(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
        if n == 0 {
            break;
        }
    }
    let suffix: String = out.into_iter().rev().collect();
    let first = suffix[..1].to_uppercase();
    format!("{}{}", first, &suffix[1..])
}

pub fn birth_date(age: i32) -> String {
    format!("{}-01-01", Utc::now().year() - age)
}

pub fn student_with_marks(n: usize, english: i32, maths: i32, science: i32) -> Value {
    json!({
        "studentId": format!("STU{:03}", n),
        "name": format!("{} {}", FIRST_NAMES[n % FIRST_NAMES.len()], letters(n)),
        "email": format!("student{}@school.test", n),
        "phone": "+14155550123",
        "dateOfBirth": birth_date(16),
        "address": {
            "street": format!("{} Main Street", n + 1),
            "city": if n % 2 == 0 { "Kochi" } else { "Mumbai" },
            "state": "Kerala",
            "zipCode": "682001"
        },
        "marks": { "english": english, "maths": maths, "science": science }
    })
}

pub fn valid_student(n: usize) -> Value {
    student_with_marks(n, 80, 70, 60)
}
