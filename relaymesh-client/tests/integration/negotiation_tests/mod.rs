mod test_responder_answers_offer;
