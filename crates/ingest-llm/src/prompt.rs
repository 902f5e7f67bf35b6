use std::fmt::Write as _;

use ingest_taxonomy::{Domain, Intent};

/// Static system prompt: the class taxonomy plus the exact compact-line
/// output contract (§4.8 step 2). Built once from the taxonomy tables so it
/// can never drift from `ingest-taxonomy`'s codes.
pub fn system_prompt() -> String {
    let mut s = String::new();
    s.push_str(
        "You are a message classifier for a community group-chat pipeline. \
         For every numbered input message, decide its intent, domain(s), \
         subcategories, spam flag, urgency, and a one-line reasoning.\n\n",
    );

    s.push_str("Intents (code=NAME):\n");
    for intent in [
        Intent::Request,
        Intent::Offer,
        Intent::Recommendation,
        Intent::Complaint,
        Intent::Info,
        Intent::Other,
    ] {
        let _ = writeln!(s, "{}={}", intent.code(), intent.as_str());
    }

    s.push_str("\nDomains (code=NAME) and their subcategories (code=NAME):\n");
    for domain in Domain::all() {
        let _ = writeln!(s, "{}={}", domain.code(), domain.as_str());
        for (sub_code, sub_name) in domain.subcategories() {
            let _ = writeln!(s, "  {}.{}={}", domain.code(), sub_code, sub_name);
        }
    }

    s.push_str(
        "\nRespond with exactly one line per input message, in input order, \
         no extra commentary, using this pipe-delimited shape:\n\
         <id>|<intent-code>|<domain-codes-csv>|<sub-block>|<spam-0-or-1>|<urgency-1..5>|<short-reasoning>\n\
         where <sub-block> is zero or more `<domain-code>=<subcode-csv>` entries \
         separated by `;`. Use domain code 12 (NONE) when nothing else fits.\n",
    );
    s
}

/// Short per-batch instruction prepended to the renumbered message list.
/// Fixed string carried over from the original analyzer verbatim.
pub fn user_prelude() -> &'static str {
    "Ответ только в формате битовых строк. Никаких пояснений. Reasoning 3-5 слов.\n"
}
