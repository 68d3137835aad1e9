//! Built-in prompt catalogue.

use tracing::{info, warn};

use crate::error::Result;
use crate::fields::{PromptCategory, PromptVariableType};
use crate::prompt_store::PromptStore;
use crate::template::{CreatePromptDto, PromptVariable};

struct SeedVariable {
    name: &'static str,
    var_type: PromptVariableType,
    description: &'static str,
    required: bool,
    example: Option<&'static str>,
}

struct SeedPrompt {
    name: &'static str,
    category: PromptCategory,
    description: &'static str,
    content: &'static str,
    variables: &'static [SeedVariable],
}

const fn var(
    name: &'static str,
    var_type: PromptVariableType,
    description: &'static str,
    required: bool,
    example: Option<&'static str>,
) -> SeedVariable {
    SeedVariable { name, var_type, description, required, example }
}

use PromptCategory as C;
use PromptVariableType as V;

const DEFAULT_PROMPTS: &[SeedPrompt] = &[
    SeedPrompt {
        name: "Design Document Generator",
        category: C::DocumentGeneration,
        description: "Generate Game Design Documents (GDD) from Q&A responses",
        content: "## Game Design Document Request

Write a complete Game Design Document in markdown from the answers below.

## Q&A Responses
{{qaResponses}}

## Reference Systems
{{referenceSystems}}

## Required Sections
1. Overview
2. Core Mechanics
3. Economy
4. Progression
5. Narrative
6. UX Flow",
        variables: &[
            var("qaResponses", V::Array, "Array of Q&A response objects with question and answer properties", true, None),
            var("referenceSystems", V::Array, "Optional array of reference system objects", false, None),
        ],
    },
    SeedPrompt {
        name: "PRD Generator",
        category: C::DocumentGeneration,
        description: "Generate Product Requirements Documents (PRD) from Game Design Documents",
        content: "## PRD Request

Turn the Game Design Document below into a Product Requirements Document.

## Game Design Document
{{gddContent}}

## Project Context
{{projectContext}}

## Required Sections
1. Goals and Non-goals
2. User Stories
3. Functional Requirements
4. Technical Constraints
5. Milestones",
        variables: &[
            var("gddContent", V::String, "The Game Design Document content in markdown format", true, None),
            var("projectContext", V::Object, "Optional project context including tech stack and architecture", false, None),
        ],
    },
    SeedPrompt {
        name: "Prototype Generator",
        category: C::DocumentGeneration,
        description: "Generate interactive HTML prototypes from PRD content",
        content: "## Prototype Request

Build a single-file interactive HTML prototype for the PRD below.

## PRD
{{prdContent}}

## Requirements
- Inline all CSS and JavaScript
- Make every navigation element clickable
- Use placeholder data where the PRD is silent",
        variables: &[var("prdContent", V::String, "The PRD content in markdown format", true, None)],
    },
    SeedPrompt {
        name: "Code Generator",
        category: C::CodeOperation,
        description: "Generate clean, well-structured code based on specifications",
        content: "## Generation Request

Type: {{type}}
Language: {{language}}
Framework: {{framework}}

## Description
{{description}}

## Additional Context
{{additionalContext}}

## Instructions
Generate clean, well-structured code that follows the conventions of {{language}}.",
        variables: &[
            var("type", V::String, "Type of generation (code, component, test, api)", true, Some("component")),
            var("language", V::String, "Target programming language", true, Some("TypeScript")),
            var("framework", V::String, "Optional framework to use", false, Some("React")),
            var("description", V::String, "Description of what to generate", true, Some("A login form component")),
            var("additionalContext", V::String, "Additional context for generation", false, None),
        ],
    },
    SeedPrompt {
        name: "Code Review",
        category: C::CodeOperation,
        description: "Perform thorough code review with actionable feedback",
        content: "## Code Review Request

Language: {{language}}
Focus areas: {{focusAreas}}

```
{{code}}
```

List each issue with its location, severity and a concrete fix.",
        variables: &[
            var("code", V::String, "The code to review", true, Some("function example() { return true; }")),
            var("language", V::String, "Programming language", true, Some("JavaScript")),
            var("focusAreas", V::Array, "Specific areas to focus on", false, Some("[\"security\", \"performance\"]")),
        ],
    },
    SeedPrompt {
        name: "Code Optimization",
        category: C::CodeOperation,
        description: "Optimize code for performance and maintainability",
        content: "## Optimization Request

Language: {{language}}
Targets: {{targets}}

```
{{code}}
```

Optimize the code while keeping its behaviour. Explain each change.",
        variables: &[
            var("code", V::String, "The code to optimize", true, None),
            var("language", V::String, "Programming language", true, Some("Python")),
            var("targets", V::Array, "Optimization targets", false, Some("[\"speed\", \"memory\"]")),
        ],
    },
    SeedPrompt {
        name: "Documentation Generator",
        category: C::CodeOperation,
        description: "Generate comprehensive documentation for code",
        content: "## Documentation Request

Language: {{language}}
Style: {{style}}

```
{{code}}
```

Document every public item, its parameters and its return value.",
        variables: &[
            var("code", V::String, "The code to document", true, Some("function calculateSum(a, b) { return a + b; }")),
            var("language", V::String, "Programming language", true, Some("JavaScript")),
            var("style", V::String, "Documentation style (jsdoc, markdown, etc.)", false, Some("jsdoc")),
        ],
    },
    SeedPrompt {
        name: "Code Analysis",
        category: C::Analysis,
        description: "Analyze code structure, patterns, and quality",
        content: "## Code Analysis Request

Language: {{language}}
Aspects: {{aspects}}

```
{{code}}
```

Report on structure, patterns in use, and quality concerns.",
        variables: &[
            var("code", V::String, "The code to analyze", true, None),
            var("language", V::String, "Programming language", true, Some("Rust")),
            var("aspects", V::Array, "Aspects to analyze", false, Some("[\"complexity\", \"patterns\", \"maintainability\"]")),
        ],
    },
    SeedPrompt {
        name: "Feature Analysis",
        category: C::Analysis,
        description: "Analyze features and extract keywords, categories, and complexity",
        content: "## Feature Analysis Request

Analyze the following features and extract relevant keywords and categories.

## Feature List
{{featureList}}

## Output Format
Respond with JSON containing keywords, categories, complexity and dependencies.",
        variables: &[var(
            "featureList",
            V::Array,
            "List of feature descriptions",
            true,
            Some("[\"User authentication\", \"Data export\", \"API integration\"]"),
        )],
    },
    SeedPrompt {
        name: "Document Modification",
        category: C::Utility,
        description: "Modify documents according to instructions while preserving structure",
        content: "## Document Modification Request

## Original Document
{{originalContent}}

## Modification Instructions
{{modificationInstructions}}

Keep the structure of the document and return it in full.",
        variables: &[
            var("originalContent", V::String, "The original document content", true, None),
            var("modificationInstructions", V::String, "Instructions for modifications", true, Some("Update section 2")),
        ],
    },
];

/// Create the built-in prompts if the store holds none. Returns how many
/// were created.
pub fn seed_default_prompts(store: &PromptStore) -> Result<usize> {
    if !store.is_empty()? {
        return Ok(0);
    }

    let mut created = 0;
    for seed in DEFAULT_PROMPTS {
        let dto = CreatePromptDto {
            name: Some(seed.name.to_string()),
            category: Some(seed.category.as_str().to_string()),
            description: Some(seed.description.to_string()),
            content: Some(seed.content.to_string()),
            variables: Some(seed.variables.iter().map(to_variable).collect()),
        };
        match store.create(dto) {
            Ok(_) => created += 1,
            Err(e) => warn!(name = seed.name, error = %e, "failed to seed prompt"),
        }
    }

    info!(count = created, "seeded default prompts");
    Ok(created)
}

fn to_variable(seed: &SeedVariable) -> PromptVariable {
    PromptVariable {
        name: seed.name.to_string(),
        var_type: seed.var_type,
        description: seed.description.to_string(),
        required: seed.required,
        example: seed.example.map(str::to_string),
    }
}
