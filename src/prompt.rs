// Prompt sent to the model for every work command.

/// Build the analysis prompt for `input`. The input is substituted verbatim.
pub fn build_prompt(input: &str) -> String {
    format!(
        r#"Analyze this work command: "{}"

Extract and infer:
1. Single most important instruction
2. 2 most relevant actions (verb+object)
3. Resolved entities with department inference

For people, return EXACTLY:
{{
  "name": "full name",
  "department": "specific department (infer from context)",
  "position": "current position",
  "traits": ["key characteristics"]
}}

Department inference rules:
- "selling target" → Sales
- "customer" → Sales
- "marketing" → Marketing
- "code/technical" → Engineering
- "finance" → Finance
- Default: "Department unspecified"

Return ONLY this JSON format:
{{
  "instructions": ["instruction"],
  "actions": ["action1", "action2"],
  "resolved_entities": {{
    "person_name": {{
      "name": "name",
      "department": "specific department",
      "position": "position",
      "traits": ["trait1", "trait2"]
    }}
  }}
}}"#,
        input
    )
}
