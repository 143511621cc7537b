// Instructor email: an address in the institutional domain near a role term
use crate::extractors::email::find_emails;
use crate::patterns::{find_term, window, ROLE_TERMS};
use crate::rules::{RuleContext, Verdict};

pub fn check_instructor_email(ctx: &RuleContext<'_>) -> Option<Verdict> {
    let emails = find_emails(ctx.text());
    let domain = &ctx.config.required_email_domain;

    if emails.is_empty() {
        return Some(
            Verdict::missing(0.9, "The outline does not list any email address.")
                .with_evidence("No email address found in the document."),
        );
    }

    let (institutional, other): (Vec<_>, Vec<_>) =
        emails.iter().partition(|email| email.in_domain(domain));

    for email in &institutional {
        let center = email.start + (email.end - email.start) / 2;
        let (_, nearby) = window(ctx.lower(), center, ctx.config.role_proximity);
        if let Some(role) = ROLE_TERMS.iter().find(|term| find_term(nearby, term).is_some()) {
            return Some(
                Verdict::present(
                    0.95,
                    format!("Instructor email {} ends with {domain}.", email.address),
                )
                .quoting(ctx, email.start, email.end)
                .with_terms([email.address, *role]),
            );
        }
    }

    if let Some(email) = institutional.first() {
        return Some(
            Verdict::present(
                0.85,
                format!(
                    "Email {} ends with {domain}, though no instructor role is named nearby.",
                    email.address
                ),
            )
            .quoting(ctx, email.start, email.end)
            .with_terms([email.address]),
        );
    }

    let found: Vec<&str> = other.iter().map(|email| email.address).collect();
    Some(
        Verdict::missing(
            0.9,
            format!("No email address ends with {domain}; the listed addresses use other domains."),
        )
        .with_evidence(format!(
            "Email address(es) found outside {domain}: {}",
            found.join(", ")
        ))
        .with_terms(found),
    )
}
