// Email address extraction
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMatch<'a> {
    pub address: &'a str,
    pub start: usize,
    pub end: usize,
}

impl EmailMatch<'_> {
    /// Address is at `domain` or one of its subdomains
    pub fn in_domain(&self, domain: &str) -> bool {
        let address = self.address.to_ascii_lowercase();
        let domain = domain.trim_start_matches('@').to_ascii_lowercase();
        address.ends_with(&format!("@{domain}")) || address.ends_with(&format!(".{domain}"))
    }
}

pub fn find_emails(text: &str) -> Vec<EmailMatch<'_>> {
    EMAIL
        .find_iter(text)
        .map(|m| EmailMatch {
            address: m.as_str(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_emails() {
        let found = find_emails("Write to jane@ucalgary.ca. Or bob.smith@haskayne.ucalgary.ca");
        let addresses: Vec<&str> = found.iter().map(|e| e.address).collect();
        assert_eq!(addresses, vec!["jane@ucalgary.ca", "bob.smith@haskayne.ucalgary.ca"]);
        assert_eq!(found[0].start, 9);
    }

    #[test]
    fn test_domain_classification() {
        let found = find_emails("a@UCalgary.ca b@haskayne.ucalgary.ca c@notucalgary.ca d@gmail.com");
        let in_domain: Vec<bool> = found.iter().map(|e| e.in_domain("ucalgary.ca")).collect();
        assert_eq!(in_domain, vec![true, true, false, false]);
    }

    #[test]
    fn test_no_email() {
        assert!(find_emails("contact me after class").is_empty());
    }
}
