use super::domain::Brief;
use super::responses::{BriefResponse, ResponseDetails, ResponseStatus};

/// Build the CSV download of a brief's submitted responses. Draft responses
/// never leave the building.
pub fn responses_csv<F>(
    brief: &Brief,
    responses: &[BriefResponse],
    supplier_name: F,
) -> Result<String, csv::Error>
where
    F: Fn(&BriefResponse) -> String,
{
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "response_id",
        "brief_id",
        "brief_title",
        "supplier_code",
        "supplier_name",
        "status",
        "submitted_at",
        "summary",
    ])?;

    let mut submitted: Vec<&BriefResponse> = responses
        .iter()
        .filter(|response| response.status() == ResponseStatus::Submitted)
        .collect();
    submitted.sort_by_key(|response| response.id);

    for response in submitted {
        let submitted_at = response
            .submitted_at
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default();
        writer.write_record([
            response.id.0.to_string(),
            brief.id.0.to_string(),
            brief.title().to_string(),
            response.supplier_code.0.to_string(),
            supplier_name(response),
            response.status().label().to_string(),
            submitted_at,
            summarize(&response.details),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn summarize(details: &ResponseDetails) -> String {
    match details {
        ResponseDetails::Specialist(response) => {
            format!("candidate: {} {}", response.given_names, response.surname)
        }
        ResponseDetails::Rfx(response) => format!(
            "{} template file(s), {} proposal file(s)",
            response.response_template.len(),
            response.written_proposal.len()
        ),
        ResponseDetails::Atm(response) => {
            format!("{} criteria answered", response.criteria.len())
        }
        ResponseDetails::Training(response) => {
            format!("{} proposal file(s)", response.written_proposal.len())
        }
    }
}
