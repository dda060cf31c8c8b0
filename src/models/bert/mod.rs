/// BERT for Text Classification (such as intent detection)
pub mod text_classification;
