//! Company background research via the generative model.

use tracing::info;

use podforge_gemini::{GeminiClient, GeminiError};

const RESEARCHER_INSTRUCTION: &str =
    "You are an expert business researcher with extensive knowledge of \
     companies across industries. Provide accurate, well-structured \
     information suitable for a podcast script.";

/// Ask the model for structured background on `company_name`.
pub async fn research_company(
    client: &GeminiClient,
    company_name: &str,
) -> Result<String, GeminiError> {
    let prompt = format!(
        "Research and provide comprehensive information about the company \
         '{company_name}'.\n\n\
         Include the following information:\n\
         1. Basic overview and history\n\
         2. Main products or services offered\n\
         3. Target market and customer base\n\
         4. Recent news or developments (within the last 1-2 years)\n\
         5. Competitive position in the industry\n\
         6. Any interesting facts or notable aspects of the company culture\n\n\
         Structure this information in a way that would be informative and \
         engaging for a podcast audience who may not be familiar with the \
         company."
    );

    info!(company = company_name, "researching company background");
    client.generate(RESEARCHER_INSTRUCTION, &[], &prompt).await
}
