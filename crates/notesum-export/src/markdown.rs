//! Built-in Markdown templates (Tera syntax), keyed by renderer.
//!
//! Every template sees the summary's top-level fields plus `report_title`.

use notesum_templates::RendererId;

pub fn template_for(renderer: RendererId) -> &'static str {
    match renderer {
        RendererId::Demographics => DEMOGRAPHICS,
        RendererId::VisitPriorities => VISIT_PRIORITIES,
        RendererId::CriticalChanges => CRITICAL_CHANGES,
        RendererId::ActiveProblemList => ACTIVE_PROBLEM_LIST,
        RendererId::AdminNotes => ADMIN_NOTES,
        RendererId::Medications => MEDICATIONS,
        RendererId::Generic => GENERIC,
    }
}

const DEMOGRAPHICS: &str = r#"# {{ report_title }}

- **Name:** {{ name }}
- **Date of birth:** {{ dob }}
{% if gender is defined %}- **Gender:** {{ gender }}
{% endif %}{% if race is defined %}- **Race:** {{ race }}
{% endif %}{% if ethnicity is defined %}- **Ethnicity:** {{ ethnicity }}
{% endif %}{% if primary_conditions is defined %}
## Primary conditions

{% for condition in primary_conditions %}- {{ condition }}
{% endfor %}{% endif %}{% if allergies is defined %}
## Allergies

{% for allergy in allergies %}- {{ allergy }}
{% endfor %}{% endif %}"#;

const VISIT_PRIORITIES: &str = r#"# {{ report_title }}
{% for priority in priorities %}
## {{ loop.index }}. {{ priority.name }}

{% for item in priority.action_items %}- [ ] {{ item }}
{% endfor %}{% endfor %}"#;

const CRITICAL_CHANGES: &str = r#"# {{ report_title }}

{% for change in changes %}- {{ change }}
{% endfor %}{% if changes | length == 0 %}_No critical changes recorded._
{% endif %}"#;

const ACTIVE_PROBLEM_LIST: &str = r#"# {{ report_title }}
{% for problem in problems %}
## {{ problem.condition_name }}{% if problem.status is defined %} ({{ problem.status }}){% endif %}
{% if problem.recent_events is defined %}
**Recent events**
{% for event in problem.recent_events %}- {{ event }}
{% endfor %}{% endif %}{% if problem.risks is defined %}
**Risks**
{% for risk in problem.risks %}- {{ risk }}
{% endfor %}{% endif %}{% if problem.coordination_notes is defined %}
**Coordination**
{% for note in problem.coordination_notes %}- {{ note }}
{% endfor %}{% endif %}{% if problem.pending_items is defined %}
**Pending**
{% for item in problem.pending_items %}- {{ item }}
{% endfor %}{% endif %}{% if problem.suggested_actions is defined %}
**Suggested actions**
{% for action in problem.suggested_actions %}- [ ] {{ action }}
{% endfor %}{% endif %}{% endfor %}"#;

const ADMIN_NOTES: &str = r#"# {{ report_title }}

{% for note in notes %}- {{ note }}
{% endfor %}{% if notes | length == 0 %}_No administrative items._
{% endif %}"#;

const MEDICATIONS: &str = r#"# {{ report_title }}
{% if medications is defined %}
| Medication | Dosage | Frequency | Start | End |
|----|----|----|----|----|
{% for m in medications %}| {{ m.name }} | {{ m.dosage }} | {{ m.frequency }} | {{ m.start_date }} | {% if m.end_date is defined %}{{ m.end_date }}{% endif %} |
{% endfor %}{% endif %}
{{ notes }}
"#;

const GENERIC: &str = r#"# {{ title }}

_{{ report_title }}_

{{ abstract }}

## Context

{{ context }}

## Key points

{% for point in key_points %}- {{ point }}
{% endfor %}{% if data is defined %}
## Data

{% for entry in data %}- {% if entry.date is defined %}{{ entry.date }}: {% endif %}{% if entry.category is defined %}**{{ entry.category }}**: {% endif %}{% if entry.details is defined %}{{ entry.details }}{% endif %}
{% endfor %}{% endif %}{% if analysis is defined %}
## Analysis

{{ analysis }}
{% endif %}{% if recommendations is defined %}
## Recommendations

{{ recommendations }}
{% endif %}
## Conclusion

{{ conclusion }}
"#;
