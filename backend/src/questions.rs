use std::path::Path;

use actix_web::{web, HttpResponse};
use shared::{QuestionBank, QuestionError};

#[derive(Debug, thiserror::Error)]
pub enum QuestionLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse question sets: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Invalid(#[from] QuestionError),
}

pub fn load_question_bank(path: &Path) -> Result<QuestionBank, QuestionLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| QuestionLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_question_bank(&contents)
}

pub fn parse_question_bank(contents: &str) -> Result<QuestionBank, QuestionLoadError> {
    let bank: QuestionBank = serde_yaml::from_str(contents)?;
    bank.validate()?;
    Ok(bank)
}

pub async fn get_questions(bank: web::Data<QuestionBank>) -> HttpResponse {
    HttpResponse::Ok().json(bank.get_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use shared::Mode;

    const BANK: &str = r#"
disease:
  - key: dry_core
    text: Is the central shoot dry?
  - key: foul_smell
    text: Does the dead shoot smell foul when pulled?
pest:
  - key: bore_holes
    text: Are there bore holes near the base?
"#;

    #[::core::prelude::v1::test]
    fn parses_bundled_format() {
        let bank = parse_question_bank(BANK).unwrap();
        assert_eq!(bank.for_mode(Mode::Disease).len(), 2);
        assert_eq!(bank.for_mode(Mode::Pest)[0].key, "bore_holes");
    }

    #[::core::prelude::v1::test]
    fn rejects_invalid_sets() {
        let err = parse_question_bank("disease: []\npest: []\n").unwrap_err();
        assert!(matches!(err, QuestionLoadError::Invalid(QuestionError::Empty(Mode::Disease))));
        assert!(matches!(
            parse_question_bank("disease: 3"),
            Err(QuestionLoadError::Parse(_))
        ));
    }

    #[::core::prelude::v1::test]
    fn bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/questions.yaml");
        let bank = load_question_bank(&path).unwrap();
        assert!(bank.disease.len() <= shared::MAX_QUESTIONS);
    }

    #[actix_web::test]
    async fn serves_bank_as_json() {
        let bank = parse_question_bank(BANK).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(bank))
                .route("/api/questions", web::get().to(get_questions)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/questions").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pest"][0]["key"], "bore_holes");
        assert_eq!(body["disease"].as_array().map(Vec::len), Some(2));
    }
}
