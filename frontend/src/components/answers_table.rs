use shared::{AnswerSheet, Question};
use yew::prelude::*;

/// Answers of one submission, in question order.
pub fn render_answers_table(questions: &[Question], answers: &AnswerSheet) -> Html {
    if questions.is_empty() {
        return html! {};
    }
    let (yes, no) = answers.yes_no_counts();

    html! {
        <details class="answers-table">
            <summary>{ format!("Answers ({} yes, {} no, {} unknown)", yes, no, questions.len().saturating_sub(yes + no)) }</summary>
            <table>
                <tbody>
                    { for questions.iter().map(|question| {
                        let value = answers.get(&question.key);
                        html! {
                            <tr>
                                <td>{ question.text.clone() }</td>
                                <td><span class={classes!("badge", value.badge_class())}>{ value.label() }</span></td>
                            </tr>
                        }
                    })}
                </tbody>
            </table>
        </details>
    }
}
