use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("DBOT_TELEGRAM_TOKEN")
            && !token.is_empty()
        {
            self.telegram.bot_token = token;
        }

        if let Ok(key) =
            std::env::var("DBOT_OPENAI_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
            && !key.is_empty()
        {
            self.chat.api_key = key;
        }

        if let Ok(model) = std::env::var("DBOT_MODEL")
            && !model.is_empty()
        {
            self.chat.model = model;
        }

        if let Ok(db_path) = std::env::var("DBOT_DB_PATH")
            && !db_path.is_empty()
        {
            self.storage.db_path = Some(db_path);
        }

        if let Ok(region) = std::env::var("AWS_REGION").or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            && !region.is_empty()
            && self.ec2.region.trim().is_empty()
        {
            self.ec2.region = region;
        }
    }
}
