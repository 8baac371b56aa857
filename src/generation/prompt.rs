//! Prompt assembly: a fixed standards preamble plus one prompt per specification.

use crate::artifact::ValidationPolicy;
use crate::catalog::Specification;

/// Built-in workspace standards, used when no standards file is configured.
pub const DEFAULT_STANDARDS: &str = "\
# Notebook Quality Standards

**Cell Structure:**
- Alternate markdown explanations and code cells
- Every code cell MUST have a markdown explanation before it
- Pattern: Markdown -> Code -> Markdown -> Code

**Content Requirements:**
- Mathematical foundations with LaTeX equations
- From-scratch implementation (NumPy, educational)
- Production implementation (sklearn/PyTorch, practical)
- Mermaid diagrams (workflow + architecture)
- 4-8 real-world projects (NOT exercises)

**Domain Context (post-silicon validation):**
- STDF test data: wafer_id, die_x, die_y, test parameters
- Electrical parameters: Vdd, Idd, frequency, power, temperature
- Use cases: yield prediction, test optimization, failure analysis
";

const REQUIRED_SECTIONS: [&str; 9] = [
    "Introduction (with Mermaid workflow diagram)",
    "Mathematical Foundation (LaTeX equations with explanations)",
    "From Scratch Implementation (NumPy only, educational)",
    "Production Implementation (sklearn/PyTorch/etc, practical)",
    "Domain Examples (post-silicon validation scenarios)",
    "General AI/ML Examples (broader applications)",
    "Evaluation & Diagnostics (metrics, visualizations)",
    "Real-World Projects (4-8 project ideas, NOT exercises)",
    "Best Practices & Takeaways",
];

const OUTPUT_FORMAT: &str = r##"{
  "cells": [
    {"cell_type": "markdown", "metadata": {}, "source": ["# <id>: <title>\n", "..."]},
    {"cell_type": "code", "execution_count": null, "metadata": {}, "outputs": [], "source": ["..."]}
  ],
  "metadata": {
    "kernelspec": {"display_name": "Python 3", "language": "python", "name": "python3"},
    "language_info": {"name": "python", "version": "3.12.0"}
  },
  "nbformat": 4,
  "nbformat_minor": 2
}"##;

/// Builds the two messages sent to the generative service.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    standards: String,
    policy: ValidationPolicy,
    domain_focus_percent: u8,
}

impl PromptBuilder {
    pub fn new(
        standards: Option<String>,
        policy: ValidationPolicy,
        domain_focus_percent: u8,
    ) -> Self {
        Self {
            standards: standards.unwrap_or_else(|| DEFAULT_STANDARDS.to_string()),
            policy,
            domain_focus_percent: domain_focus_percent.min(100),
        }
    }

    /// Instructional preamble shared by every request.
    ///
    /// The structural limits quoted to the service are the ones the validator
    /// will check.
    pub fn system_prompt(&self) -> String {
        let policy = &self.policy;
        let mut prompt = String::from(
            "You are an expert AI/ML educator creating comprehensive Jupyter notebooks.\n\n",
        );
        prompt.push_str(&format!(
            "WORKSPACE CONTEXT:\n{}\n",
            self.standards.trim_end()
        ));

        prompt.push_str("\nCRITICAL REQUIREMENTS:\n");
        prompt.push_str("1. Cell Structure: alternate markdown explanations and code cells\n");
        prompt.push_str(&format!(
            "2. Code Cell Size: NEVER exceed {} lines per code cell\n",
            policy.max_executable_lines
        ));
        prompt.push_str(
            "3. Explanations First: every code cell MUST have a markdown explanation before it\n",
        );
        prompt.push_str(&format!(
            "4. Domain Balance: {}% domain-focused examples + {}% general AI/ML examples\n",
            self.domain_focus_percent,
            100 - self.domain_focus_percent
        ));
        prompt.push_str("5. Title: the first cell is markdown and starts with \"# <id>: <title>\"\n");

        prompt.push_str("\nNOTEBOOK STRUCTURE (Required Sections):\n");
        for (index, section) in REQUIRED_SECTIONS.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", index + 1, section));
        }

        prompt.push_str(&format!(
            "\nOUTPUT FORMAT:\nGenerate the complete notebook as nbformat JSON:\n{}\n",
            OUTPUT_FORMAT
        ));

        prompt.push_str("\nQUALITY CHECKS:\n");
        prompt.push_str(&format!(
            "- Total cells: {}-{} (alternating markdown/code)\n",
            policy.min_blocks, policy.max_blocks
        ));
        prompt.push_str(&format!(
            "- Code cells: each at most {} lines\n",
            policy.max_executable_lines
        ));
        prompt.push_str(&format!(
            "- Diagrams: at least one markdown cell containing {}\n",
            quoted(&policy.diagram_markers)
        ));
        prompt.push_str(&format!(
            "- Projects: a markdown section marked with {}\n",
            quoted(&policy.project_markers)
        ));
        prompt
    }

    /// Per-specification prompt.
    pub fn user_prompt(&self, spec: &Specification) -> String {
        let mut prompt = format!(
            "Generate Notebook {}: {}\n\n**Category**: {}\n\n",
            spec.id,
            spec.display_title(),
            spec.category
        );

        prompt.push_str("**Topics to Cover**:\n");
        prompt.push_str(&bullet_list(&spec.topics));

        prompt.push_str("\n**Domain Focus**:\n");
        prompt.push_str(&bullet_list(&spec.domain_focus));

        prompt.push_str(&format!(
            "\n**Prerequisites**: {}\n",
            spec.prerequisites.join(", ")
        ));

        if let Some(objectives) = &spec.learning_objectives {
            prompt.push_str("\n**Learning Objectives**:\n");
            prompt.push_str(&bullet_list(objectives));
        }

        prompt.push_str(
            "\nGenerate a COMPLETE notebook following ALL workspace standards, including \
             from-scratch and production implementations, evaluation, mermaid diagrams and \
             4-8 real-world project ideas.\n",
        );
        prompt.push_str("\nReturn ONLY valid JSON (no markdown formatting, no code blocks).\n");
        prompt
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)\n".to_string();
    }
    items.iter().map(|item| format!("- {}\n", item)).collect()
}

fn quoted(markers: &[String]) -> String {
    markers
        .iter()
        .map(|m| format!("\"{}\"", m))
        .collect::<Vec<_>>()
        .join(" or ")
}
