//! Prompt template for patch requests.

const PROMPT_HEAD: &str = "\
You are a Python assistant that secures functions.
Task:
Given ONE Python function that uses type hints but has NO runtime type checks,
modify it by ADDING minimal isinstance() checks at the beginning of the function
for EACH annotated parameter.

STRICT RULES:
- You MUST add at least one isinstance() check.
- Output ONLY the patched function.
- Do NOT add example calls, tests, decorators, or explanations.
- Do NOT print anything extra.
- Return ONLY the modified function.
- Wrap your answer in a single ```python code block.

Original function:
```python
";

const PROMPT_TAIL: &str = "
```
Patched function:
";

/// Embed a function's source in the fixed patch prompt.
///
/// The rules in the prompt are instructions to the model only; nothing here
/// or downstream enforces them.
pub fn render_prompt(func_code: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEAD.len() + func_code.len() + PROMPT_TAIL.len());
    prompt.push_str(PROMPT_HEAD);
    prompt.push_str(func_code);
    prompt.push_str(PROMPT_TAIL);
    prompt
}
