//! Synthetic values for `RANDOM` fixture cells

use chrono::Utc;
use rand::Rng;

/// An 11-digit CPF with valid check digits.
pub fn cpf() -> String {
    let mut rng = rand::thread_rng();
    let mut digits: Vec<u32> = (0..9).map(|_| rng.gen_range(0..10)).collect();

    let first = check_digit(&digits, 10);
    digits.push(first);
    let second = check_digit(&digits, 11);
    digits.push(second);

    digits.iter().map(|d| d.to_string()).collect()
}

/// A unique-per-millisecond e-mail address.
pub fn email() -> String {
    format!("random_{}@exemplo.com", Utc::now().timestamp_millis())
}

fn check_digit(digits: &[u32], initial_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (initial_weight - i as u32))
        .sum();
    match sum % 11 {
        rem if rem < 2 => 0,
        rem => 11 - rem,
    }
}

/// True when `cpf` has eleven digits and both check digits match.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || cpf.len() != 11 {
        return false;
    }
    check_digit(&digits[..9], 10) == digits[9] && check_digit(&digits[..10], 11) == digits[10]
}
